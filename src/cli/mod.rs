//! CLI argument parsing for vpnblock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// vpnblock: block and unblock VPN clients.
///
/// OpenVPN clients are blocked by common name: the live session is killed
/// through the management interface and the name is recorded in a blocklist
/// file the server consults on connect. WireGuard peers are blocked by
/// rerouting their allowed-ips to a loopback sink.
#[derive(Parser, Debug)]
#[command(name = "vpnblock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true, env = "VPNBLOCK_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Blocklist file (overrides config and OVPN_BLOCKLIST).
    #[arg(long, global = true, value_name = "FILE")]
    pub blocklist: Option<PathBuf>,

    /// Stderr log level: trace, debug, info, warn or error.
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for vpnblock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Block, unblock and list OpenVPN clients.
    Ovpn(OvpnCommand),

    /// Block, unblock and inspect WireGuard peers.
    Wg(WgCommand),

    /// Work on the blocklist file directly.
    ///
    /// No session is touched; entries are arbitrary single-line strings.
    Store(StoreCommand),

    /// Inspect the effective configuration.
    Config(ConfigCommand),
}

// ============================================================================
// ovpn
// ============================================================================

/// Arguments for the `ovpn` command group.
#[derive(Parser, Debug)]
pub struct OvpnCommand {
    #[command(subcommand)]
    pub action: OvpnAction,
}

/// OpenVPN actions.
#[derive(Subcommand, Debug)]
pub enum OvpnAction {
    /// Kill the client's session and add it to the blocklist.
    ///
    /// A failed kill is reported but the block is still recorded.
    Block(CommonNameArgs),

    /// Remove the client from the blocklist.
    Unblock(CommonNameArgs),

    /// List blocked common names.
    List(ListArgs),
}

/// A single OpenVPN client.
#[derive(Parser, Debug)]
pub struct CommonNameArgs {
    /// Certificate common name, without the "CN=" prefix.
    #[arg(value_name = "CN")]
    pub common_name: String,
}

// ============================================================================
// wg
// ============================================================================

/// Arguments for the `wg` command group.
#[derive(Parser, Debug)]
pub struct WgCommand {
    /// Interface to act on (overrides config and WG_INT_NAME).
    #[arg(long, short = 'i', value_name = "NAME")]
    pub interface: Option<String>,

    #[command(subcommand)]
    pub action: WgAction,
}

/// WireGuard actions.
#[derive(Subcommand, Debug)]
pub enum WgAction {
    /// Reroute the peer to the loopback sink and save the interface.
    ///
    /// Prints the peer's previous allowed-ips so it can be unblocked later.
    Block(PublicKeyArgs),

    /// Point the peer back at its address and save the interface.
    Unblock(WgUnblockArgs),

    /// Print the peer's current allowed-ips.
    Show(PublicKeyArgs),
}

/// A single WireGuard peer.
#[derive(Parser, Debug)]
pub struct PublicKeyArgs {
    /// Base64 public key of the peer.
    #[arg(value_name = "KEY")]
    pub key: String,
}

/// Arguments for `wg unblock`.
#[derive(Parser, Debug)]
pub struct WgUnblockArgs {
    /// Base64 public key of the peer.
    #[arg(value_name = "KEY")]
    pub key: String,

    /// Address to route the peer to again.
    #[arg(value_name = "IP")]
    pub ip: IpAddr,
}

// ============================================================================
// store
// ============================================================================

/// Arguments for the `store` command group.
#[derive(Parser, Debug)]
pub struct StoreCommand {
    #[command(subcommand)]
    pub action: StoreAction,
}

/// Blocklist actions.
#[derive(Subcommand, Debug)]
pub enum StoreAction {
    /// Print every entry in file order.
    List(ListArgs),

    /// Print "true" if the entry is present, "false" otherwise.
    Contains(ItemArgs),

    /// Add an entry. Adding a present entry changes nothing.
    Add(ItemArgs),

    /// Remove an entry. Removing an absent entry changes nothing.
    Remove(ItemArgs),

    /// Atomically replace the whole blocklist.
    ///
    /// Reads one entry per line from FILE, or from stdin when FILE is "-"
    /// or omitted. Blank lines are skipped.
    Replace(ReplaceArgs),
}

/// A single blocklist entry.
#[derive(Parser, Debug)]
pub struct ItemArgs {
    /// Entry value.
    #[arg(value_name = "ITEM")]
    pub item: String,
}

/// Arguments for list commands.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Print a JSON array instead of one entry per line.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `store replace`.
#[derive(Parser, Debug)]
pub struct ReplaceArgs {
    /// Source of the new entries ("-" for stdin).
    #[arg(value_name = "FILE", default_value = "-")]
    pub source: PathBuf,
}

// ============================================================================
// config
// ============================================================================

/// Arguments for the `config` command group.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as YAML.
    ///
    /// Shows defaults merged with the config file, environment and flags.
    Show,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
