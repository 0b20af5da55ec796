use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use polyserial::{
    compress, decompress, dump_to_string, Codec, CodecLimits, Envelope, EnvelopeHeader, Registry,
};

#[derive(Parser)]
#[command(author, version, about = "Inspect and convert polyserial envelopes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the envelope header of a text or network file.
    Inspect {
        input: PathBuf,
        /// Treat the input as a compressed network frame.
        #[arg(long, default_value_t = false)]
        network: bool,
    },
    /// Check an envelope text file and write it as a network frame.
    Pack {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Decompress a network frame back to envelope text.
    Unpack {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Decode with the built-in containers and check the re-encoding matches.
    Verify {
        input: PathBuf,
        #[arg(long, default_value_t = false)]
        network: bool,
        /// TOML file overriding the default decode limits.
        #[arg(long)]
        limits: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct InspectReport {
    source: &'static str,
    bytes: usize,
    #[serde(flatten)]
    header: EnvelopeHeader,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("POLYSERIAL_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Inspect { input, network } => inspect(&input, network),
        Command::Pack { input, output } => pack(&input, &output),
        Command::Unpack { input, output } => unpack(&input, &output),
        Command::Verify {
            input,
            network,
            limits,
        } => verify(&input, network, limits.as_deref()),
    }
}

fn read_envelope_text(path: &Path, network: bool, limits: &CodecLimits) -> Result<String> {
    if network {
        let frame = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let text = decompress(&frame, limits)
            .with_context(|| format!("decompress {}", path.display()))?;
        debug!(frame_len = frame.len(), text_len = text.len(), "unpacked frame");
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))
}

fn inspect(path: &Path, network: bool) -> Result<()> {
    let limits = CodecLimits::default();
    let text = read_envelope_text(path, network, &limits)?;
    let envelope = Envelope::from_text(&text, &limits).context("parse envelope")?;
    let report = InspectReport {
        source: if network { "network" } else { "text" },
        bytes: text.len(),
        header: envelope.header(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn pack(input: &Path, output: &Path) -> Result<()> {
    let limits = CodecLimits::default();
    let text = read_envelope_text(input, false, &limits)?;
    let envelope = Envelope::from_text(text.trim_end(), &limits).context("parse envelope")?;
    let frame = compress(&envelope.to_text());
    write_output(output, &frame)?;
    info!(tag = %envelope.tag, frame_len = frame.len(), "packed envelope");
    Ok(())
}

fn unpack(input: &Path, output: &Path) -> Result<()> {
    let limits = CodecLimits::default();
    let text = read_envelope_text(input, true, &limits)?;
    write_output(output, text.as_bytes())?;
    info!(text_len = text.len(), "unpacked frame");
    Ok(())
}

fn verify(input: &Path, network: bool, limits_path: Option<&Path>) -> Result<()> {
    let limits = match limits_path {
        Some(path) => CodecLimits::load(path)
            .with_context(|| format!("load limits {}", path.display()))?,
        None => CodecLimits::default(),
    };
    let text = read_envelope_text(input, network, &limits)?;
    let registry = Registry::builtin();
    let codec = Codec::new(&registry).with_limits(limits);

    let obj = codec
        .create_from_string(text.trim_end())
        .context("decode envelope")?;
    let original: Value = serde_json::from_str(text.trim_end()).context("parse envelope")?;
    let reencoded: Value = serde_json::from_str(&dump_to_string(obj.as_ref()))?;
    if original != reencoded {
        bail!(
            "re-encoding {} does not reproduce the input",
            obj.type_tag()
        );
    }
    println!("ok: {} version {}", obj.type_tag(), obj.version());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DICTIONARY: &str = r#"[21,1,[[["k",1]],[["list",[26,1,[]]]],[],[]]]"#;

    #[test]
    fn pack_then_unpack_restores_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let text = dir.path().join("dict.json");
        let frame = dir.path().join("out/dict.lz4");
        let restored = dir.path().join("restored.json");
        fs::write(&text, format!("{DICTIONARY}\n")).expect("write");

        pack(&text, &frame).expect("pack");
        unpack(&frame, &restored).expect("unpack");
        assert_eq!(fs::read_to_string(&restored).expect("read"), DICTIONARY);
        verify(&frame, true, None).expect("verify frame");
    }

    #[test]
    fn pack_refuses_non_envelopes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let text = dir.path().join("bad.json");
        fs::write(&text, r#"{"not":"a tuple"}"#).expect("write");
        assert!(pack(&text, &dir.path().join("bad.lz4")).is_err());
    }

    #[test]
    fn verify_rejects_tags_without_builtin_variant() {
        let dir = tempfile::tempdir().expect("tempdir");
        let text = dir.path().join("periodic.json");
        fs::write(&text, r#"[4,1,[60,3]]"#).expect("write");
        assert!(verify(&text, false, None).is_err());
    }
}
