use std::fmt::Display;
use std::io::{self, Write};

use anyhow::Result;
use clap::Parser as ClapParser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use log::Record;

use cli::command::{Cli, Commands, LogFormat};
use cli::extract::cmd_extract;
use cli::info::cmd_info;

mod cli;
mod input;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let base_level = cli.loglevel.to_level_filter();

    let multi = MultiProgress::new();

    let mut env_builder = env_logger::Builder::from_default_env();
    env_builder.filter_level(base_level);
    match cli.log_format {
        LogFormat::Plain => {
            env_builder.format_timestamp_secs();
        }
        LogFormat::Json => {
            env_builder.format(|buf, record| {
                let ts = buf.timestamp();
                write_json(buf, &ts, record)
            });
        }
    }

    let pb = if cli.progress {
        let logger = env_builder.build();
        LogWrapper::new(multi.clone(), logger).try_init()?;
        log::set_max_level(base_level);
        Some(&multi)
    } else {
        env_builder.try_init()?;
        None
    };

    match cli.command {
        Commands::Info(ref args) => cmd_info(args, &cli)?,
        Commands::Extract(ref args) => cmd_extract(args, &cli, pb)?,
    }

    Ok(())
}

/// Writes `record` as a single-line JSON object.
fn write_json<W: Write>(out: &mut W, ts: &dyn Display, record: &Record) -> io::Result<()> {
    let quote = |text: String| serde_json::to_string(&text).map_err(io::Error::other);
    writeln!(
        out,
        "{{\"ts\":{},\"lvl\":\"{}\",\"target\":{},\"msg\":{}}}",
        quote(ts.to_string())?,
        record.level(),
        quote(record.target().to_string())?,
        quote(record.args().to_string())?
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn json_log_lines_escape_messages() -> Result<()> {
        let mut out = Vec::new();
        write_json(
            &mut out,
            &"2026-01-01T00:00:00Z",
            &Record::builder()
                .args(format_args!("bad \"name\"\tline\nnext"))
                .level(Level::Warn)
                .target("dvdvr::process::extract")
                .build(),
        )?;

        let line = String::from_utf8(out)?;
        assert_eq!(line.lines().count(), 1);

        let value: serde_json::Value = serde_json::from_str(&line)?;
        assert_eq!(value["ts"], "2026-01-01T00:00:00Z");
        assert_eq!(value["lvl"], "WARN");
        assert_eq!(value["target"], "dvdvr::process::extract");
        assert_eq!(value["msg"], "bad \"name\"\tline\nnext");
        Ok(())
    }
}
