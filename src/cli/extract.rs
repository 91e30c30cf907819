use std::fs::File;
use std::io;

use anyhow::{Context, Result, bail};
use indicatif::MultiProgress;
use log::{info, warn};

use dvdvr::process::extract::{ExtractSummary, Extractor};
use dvdvr::structs::program::ProgramDescriptor;
use dvdvr::utils::cache::{SectorSink, SectorSource, advise_sequential};

use super::command::{Cli, ExtractArgs};
use super::info::LoadedDisc;
use super::output::{Destination, touch};
use super::progress::{create_progress_bar, update};

pub fn cmd_extract(args: &ExtractArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    let disc = LoadedDisc::load(&args.ifo, cli, args.program)?;
    let destination = Destination::new(args.name.as_deref(), &args.output_dir);
    check_destination(&destination, disc.programs.len())?;

    // Keep stdout clean when the stream goes there
    let report = disc.report()?;
    match destination {
        Destination::Stdout => report.write(&mut io::stderr().lock(), args.format)?,
        Destination::Files(_) => report.write(&mut io::stdout().lock(), args.format)?,
    }

    let mut vro = File::open(&args.vro)
        .with_context(|| format!("Failed to open VRO file: {}", args.vro.display()))?;
    advise_sequential(&vro);

    let touch_files = !args.no_touch;
    extract_all(&disc.programs, &mut vro, &destination, touch_files, multi)
}

fn check_destination(destination: &Destination, selected: usize) -> Result<()> {
    if *destination == Destination::Stdout && selected != 1 {
        bail!(
            "Writing to stdout needs exactly one program, but {selected} are selected. \
             Pick one with --program"
        );
    }
    Ok(())
}

/// Extracts `programs` one after another from `vro`.
///
/// Read faults degrade only the program they hit. Write failures and file
/// creation errors stop the whole run.
fn extract_all<S: SectorSource>(
    programs: &[ProgramDescriptor],
    vro: &mut S,
    destination: &Destination,
    touch_files: bool,
    multi: Option<&MultiProgress>,
) -> Result<()> {
    for program in programs {
        match destination {
            Destination::Stdout => {
                let mut stdout = io::stdout().lock();
                extract_program(program, &mut *vro, &mut stdout, multi)?;
            }
            Destination::Files(namer) => {
                let (path, mut file) = namer.create(program)?;
                info!("Extracting program {} to {}", program.number, path.display());

                extract_program(program, &mut *vro, &mut file, multi)
                    .with_context(|| format!("Failed to extract to {}", path.display()))?;

                if touch_files {
                    if let Some(time) = &program.recorded {
                        if let Err(e) = touch(&file, time) {
                            warn!("Could not set the time of {}: {e}", path.display());
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn extract_program<S: SectorSource, W: SectorSink>(
    program: &ProgramDescriptor,
    vro: S,
    sink: &mut W,
    multi: Option<&MultiProgress>,
) -> Result<ExtractSummary> {
    let pb = multi
        .map(|multi| create_progress_bar(multi, program))
        .transpose()?;

    let mut copied = 0u64;
    let result = Extractor::new(&program.vobu_map, vro, sink)?.run(|unit| {
        copied += unit.consumed;
        if let Some(pb) = &pb {
            update(pb, unit, copied);
        }
    });

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }
    let summary = result?;

    if summary.is_degraded() {
        warn!(
            "Program {}: {} of {} VOBUs could not be read completely; the output has gaps",
            program.number,
            summary.degraded_units.len(),
            summary.units
        );
    }
    log::debug!(
        "Program {}: {} bytes declared, {copied} bytes copied",
        program.number,
        summary.total_bytes()
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::Path;

    use clap::Parser;
    use dvdvr::SECTOR_SIZE;
    use dvdvr::fixture::{FaultySource, IfoBuilder, ProgramFixture, vro_payload};
    use dvdvr::process::ifo::Ifo;

    use crate::cli::command::Commands;
    use crate::cli::output::OutputNamer;

    const SECTOR: usize = SECTOR_SIZE as usize;

    /// Two programs recorded at the same time, 35 sectors each.
    fn two_programs() -> IfoBuilder {
        IfoBuilder::default()
            .program(ProgramFixture::new(0, &[10, 20, 5]))
            .program(ProgramFixture::new(35, &[10, 20, 5]))
    }

    fn programs() -> Result<Vec<ProgramDescriptor>> {
        let ifo = Ifo::from_bytes(two_programs().build().data)?;
        let table = ifo.program_info_table()?;
        (1..=2).map(|index| ifo.program(&table, index)).collect()
    }

    fn extract_cli(ifo: &Path, vro: &Path, extra: &[&str]) -> Cli {
        let mut args: Vec<OsString> = vec!["dvd-vr".into(), "extract".into()];
        args.push(ifo.into());
        args.push(vro.into());
        args.extend(extra.iter().copied().map(OsString::from));
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn two_programs_with_equal_timestamps() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let vro_path = dir.path().join("VR_MOVIE.VRO");
        let payload = vro_payload(70);
        std::fs::write(&vro_path, &payload)?;

        let mut vro = File::open(&vro_path)?;
        let namer = OutputNamer::new(dir.path(), None);
        let mut outputs = Vec::new();

        for program in programs()? {
            let (path, mut file) = namer.create(&program)?;
            let summary = extract_program(&program, &mut vro, &mut file, None)?;
            assert_eq!(summary.total_bytes(), 71680);
            assert!(!summary.is_degraded());
            outputs.push(path);
        }

        assert_ne!(outputs[0], outputs[1]);
        let first = std::fs::read(&outputs[0])?;
        let second = std::fs::read(&outputs[1])?;
        assert_eq!(first, payload[..71680]);
        assert_eq!(second, payload[71680..]);
        Ok(())
    }

    #[test]
    fn read_fault_only_degrades_its_program() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let payload = vro_payload(70);
        let faulty = 12 * SECTOR_SIZE..13 * SECTOR_SIZE;
        let mut vro = FaultySource::new(payload.clone(), faulty);
        let destination = Destination::Files(OutputNamer::new(dir.path(), None));

        extract_all(&programs()?, &mut vro, &destination, false, None)?;

        // Second VOBU breaks off after two sectors and the rest of it is skipped
        let first = std::fs::read(dir.path().join("2024-03-05_14-30-45.vob"))?;
        let kept = [&payload[..12 * SECTOR], &payload[30 * SECTOR..35 * SECTOR]].concat();
        assert_eq!(first, kept);

        let second = std::fs::read(dir.path().join("2024-03-05_14-30-45#002.vob"))?;
        assert_eq!(second, payload[35 * SECTOR..]);
        Ok(())
    }

    #[test]
    fn stdout_needs_a_single_program() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let ifo_path = dir.path().join("VR_MANGR.IFO");
        let vro_path = dir.path().join("VR_MOVIE.VRO");
        std::fs::write(&ifo_path, two_programs().build().data)?;
        std::fs::write(&vro_path, vro_payload(70))?;

        let cli = extract_cli(&ifo_path, &vro_path, &["--name", "-"]);
        let Commands::Extract(args) = &cli.command else {
            panic!("expected extract");
        };
        let err = cmd_extract(args, &cli, None).unwrap_err();
        assert!(err.to_string().contains("exactly one program, but 2"));
        Ok(())
    }

    #[test]
    fn extracts_every_program_to_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let ifo_path = dir.path().join("VR_MANGR.IFO");
        let vro_path = dir.path().join("VR_MOVIE.VRO");
        std::fs::write(&ifo_path, two_programs().build().data)?;
        std::fs::write(&vro_path, vro_payload(70))?;

        let out = dir.path().join("out");
        std::fs::create_dir(&out)?;
        let out_dir = out.to_str().unwrap();
        let extra = ["--name", "holiday", "--output-dir", out_dir, "--no-touch"];
        let cli = extract_cli(&ifo_path, &vro_path, &extra);
        let Commands::Extract(args) = &cli.command else {
            panic!("expected extract");
        };
        cmd_extract(args, &cli, None)?;

        for name in ["holiday#001.vob", "holiday#002.vob"] {
            let metadata = std::fs::metadata(out.join(name))?;
            assert_eq!(metadata.len(), 71680);
        }
        Ok(())
    }
}
