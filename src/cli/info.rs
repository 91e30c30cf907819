use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use dvdvr::process::ifo::Ifo;
use dvdvr::structs::program::ProgramDescriptor;
use dvdvr::structs::program_info::ProgramInfoTable;
use dvdvr::structs::program_set::ProgramSetInfo;

use super::command::{Cli, InfoArgs};
use super::report::DiscReport;
use crate::input::InputReader;

/// The decoded navigation data for the selected programs.
pub struct LoadedDisc {
    pub ifo: Ifo,
    pub table: ProgramInfoTable,
    pub programs: Vec<ProgramDescriptor>,
    pub sets: Option<ProgramSetInfo>,
}

impl LoadedDisc {
    /// Loads the IFO and decodes either every program or just `program`.
    pub fn load(path: &Path, cli: &Cli, program: Option<usize>) -> Result<Self> {
        let reader = InputReader::new(path)?;
        if reader.is_pipe() {
            log::debug!("Reading navigation data from stdin");
        }
        let mut ifo = Ifo::from_reader(reader)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        ifo.set_fail_level(cli.fail_level());

        log::debug!("Loaded {} bytes of navigation data", ifo.len());

        let table = ifo.program_info_table()?;
        let programs = match program {
            Some(index) => vec![ifo.program(&table, index)?],
            None => (1..=table.program_count())
                .map(|index| ifo.program(&table, index))
                .collect::<Result<Vec<_>>>()?,
        };
        let sets = ifo.program_sets()?;

        Ok(Self {
            ifo,
            table,
            programs,
            sets,
        })
    }

    pub fn report(&self) -> Result<DiscReport> {
        DiscReport::build(&self.ifo, &self.table, &self.programs, self.sets.as_ref())
    }
}

pub fn cmd_info(args: &InfoArgs, cli: &Cli) -> Result<()> {
    log::info!("Reading DVD-VR navigation data: {}", args.ifo.display());

    let disc = LoadedDisc::load(&args.ifo, cli, args.program)?;
    disc.report()?.write(&mut io::stdout().lock(), args.format)
}
