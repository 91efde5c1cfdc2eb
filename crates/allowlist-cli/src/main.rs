//! Allowlist tooling for the messaging contract.
//! Prints one JSON object to stdout per command; logs go to stderr.
//! Hashes with SHA-256, the same function the program computes on-chain.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::info;

use allowlist_core::{
    leaf_for, validate, AllowlistTree, Call, Caller, Identity, LocalLedger, Message, MerkleWitness, Sha256Hasher,
    B256, U256,
};

/// Defines the CLI and the selected subcommand.
#[derive(Parser, Debug)]
#[command(name = "allowlist-cli")]
#[command(about = "Allowlist root, witness and message helper for the messaging contract", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Lists available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Prints the leaf value of an identity.
    Leaf {
        #[arg(long)]
        identity: String,
    },
    /// Builds the allowlist tree and prints its root.
    Root {
        #[arg(long, env = "ALLOWLIST_FILE")]
        allowlist: PathBuf,
    },
    /// Prints the authentication path for one slot.
    Witness {
        #[arg(long, env = "ALLOWLIST_FILE")]
        allowlist: PathBuf,
        #[arg(long)]
        index: u64,
    },
    /// Checks message content (0x…, 0b… or decimal) against the flag rules.
    Validate {
        #[arg(long)]
        content: String,
    },
    /// Runs deploy / store / send_message scenarios on an in-memory ledger.
    Demo,
}

/// Allowlist file: `{ "slots": [ { "index": 0, "identity": "0x…" } ] }`.
#[derive(Deserialize, Debug)]
struct AllowlistFile {
    slots: Vec<SlotEntry>,
}

#[derive(Deserialize, Debug)]
struct SlotEntry {
    index: u64,
    identity: String,
}

/// Holds JSON output of leaf.
#[derive(Serialize)]
struct OutLeaf {
    identity: String,
    leaf: String,
}

/// Holds JSON output of root.
#[derive(Serialize)]
struct OutRoot {
    root: String,
    slots: usize,
}

/// Holds JSON output of witness.
#[derive(Serialize)]
struct OutWitness {
    index: u64,
    root: String,
    leaf: String,
    path: Vec<String>,
    #[serde(rename = "isLeft")]
    is_left: Vec<bool>,
}

/// Holds JSON output of validate.
#[derive(Serialize)]
struct OutValidate {
    content: String,
    valid: bool,
    error: Option<String>,
}

/// Holds JSON output of demo.
#[derive(Serialize)]
struct OutDemo {
    steps: Vec<OutStep>,
    #[serde(rename = "allowlistRoot")]
    allowlist_root: String,
    #[serde(rename = "sentMessagesNum")]
    sent_messages_num: u64,
    events: Vec<OutEvent>,
}

#[derive(Serialize)]
struct OutStep {
    step: &'static str,
    outcome: String,
}

#[derive(Serialize)]
struct OutEvent {
    sender: String,
    content: String,
}

fn hex32(bytes: &B256) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn parse_identity(s: &str) -> Result<Identity> {
    let raw = hex::decode(s.trim_start_matches("0x")).with_context(|| format!("identity {s:?} is not hex"))?;
    let bytes: [u8; 32] = raw
        .try_into()
        .map_err(|v: Vec<u8>| anyhow!("identity must be 32 bytes, got {}", v.len()))?;
    Ok(Identity::new(bytes))
}

fn parse_content(s: &str) -> Result<U256> {
    let cleaned = s.replace('_', "");
    U256::from_str(&cleaned).map_err(|e| anyhow!("invalid content {s:?}: {e}"))
}

/// Builds the tree from an allowlist file; returns it with the number of filled slots.
fn load_tree(path: &Path) -> Result<(AllowlistTree<Sha256Hasher>, usize)> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let file: AllowlistFile =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

    let mut tree = AllowlistTree::new(Sha256Hasher);
    let mut seen = BTreeSet::new();
    for slot in &file.slots {
        if !seen.insert(slot.index) {
            bail!("slot {} listed twice", slot.index);
        }
        let identity = parse_identity(&slot.identity)?;
        tree.add_identity(slot.index, &identity)?;
    }
    info!(slots = file.slots.len(), root = %tree.root(), "allowlist tree built");
    Ok((tree, file.slots.len()))
}

/// Deterministic demo key.
fn demo_identity(tag: u8) -> Identity {
    let mut key = [0u8; 32];
    key[0] = 0xD3;
    key[31] = tag;
    Identity::new(key)
}

fn run_demo() -> Result<OutDemo> {
    let admin = demo_identity(0);
    let user = demo_identity(1);
    let outsider = demo_identity(2);

    let mut tree = AllowlistTree::new(Sha256Hasher);
    tree.add_identity(0, &user)?;
    let witness: MerkleWitness = tree.witness(0)?;

    let correct = U256::from(0b1111111100000000001111111111111000_011100u64);
    let send = |content: U256| Call::SendMessage { message: Message::new(content), witness };

    let mut ledger = LocalLedger::deploy(Sha256Hasher, admin);
    let mut steps = Vec::new();
    let mut record = |step: &'static str, res: Result<(), allowlist_core::ContractError>| {
        let outcome = match res {
            Ok(()) => "ok".to_string(),
            Err(e) => e.to_string(),
        };
        steps.push(OutStep { step, outcome });
    };

    record("store", ledger.submit(Caller::signed(admin), Call::Store { new_root: tree.root() }));
    record("send_from_outsider", ledger.submit(Caller::signed(outsider), send(U256::ZERO)));
    record("send_invalid_flags", ledger.submit(Caller::signed(user), send(U256::from(0b110000u64))));
    record("send_correct", ledger.submit(Caller::signed(user), send(correct)));
    record("send_again", ledger.submit(Caller::signed(user), send(correct)));

    let events = ledger
        .events()
        .iter()
        .map(|e| OutEvent { sender: e.sender.to_string(), content: e.content.to_string() })
        .collect();

    Ok(OutDemo {
        steps,
        allowlist_root: hex32(&ledger.allowlist_root()),
        sent_messages_num: ledger.sent_messages_num(),
        events,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parses flags and dispatches.
    let cli = Cli::parse();

    match cli.command {
        Commands::Leaf { identity } => {
            let id = parse_identity(&identity)?;
            let out = OutLeaf { identity: hex32(&id.0), leaf: hex32(&leaf_for(&Sha256Hasher, &id)) };
            println!("{}", serde_json::to_string(&out)?);
        }
        Commands::Root { allowlist } => {
            let (tree, slots) = load_tree(&allowlist)?;
            let out = OutRoot { root: hex32(&tree.root()), slots };
            println!("{}", serde_json::to_string(&out)?);
        }
        Commands::Witness { allowlist, index } => {
            let (tree, _) = load_tree(&allowlist)?;
            let witness = tree.witness(index)?;
            let out = OutWitness {
                index,
                root: hex32(&tree.root()),
                leaf: hex32(&tree.leaf(index)?),
                path: witness.path.iter().map(hex32).collect(),
                is_left: witness.is_left.to_vec(),
            };
            println!("{}", serde_json::to_string(&out)?);
        }
        Commands::Validate { content } => {
            let value = parse_content(&content)?;
            let res = validate(value);
            let out = OutValidate {
                content: value.to_string(),
                valid: res.is_ok(),
                error: res.err().map(|e| e.to_string()),
            };
            println!("{}", serde_json::to_string(&out)?);
        }
        Commands::Demo => {
            let out = run_demo()?;
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}
