use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use dvdvr::process::extract::UnitOutcome;
use dvdvr::structs::program::ProgramDescriptor;

const TEMPLATE: &str = "{bar:40.cyan/blue} {pos}/{len} VOBUs ({percent}%)\n\
                        {msg} | elapsed: {elapsed_precise} | ETA: {eta_precise}";

/// One bar per program, advanced once per VOBU.
pub fn create_progress_bar(
    multi: &MultiProgress,
    program: &ProgramDescriptor,
) -> Result<ProgressBar> {
    let pb = multi.add(ProgressBar::new(program.vobu_map.vobu_count() as u64));
    pb.set_style(ProgressStyle::with_template(TEMPLATE)?);
    pb.set_message(format!("program {}", program.number));
    Ok(pb)
}

/// Advances `pb` past `unit` and notes how much has been copied.
pub fn update(pb: &ProgressBar, unit: &UnitOutcome, copied: u64) {
    pb.inc(1);
    if unit.is_degraded() {
        pb.set_message(format!(
            "VOBU {} damaged, {} MB copied",
            unit.index,
            copied / 1_000_000
        ));
    } else if pb.position() % 64 == 0 {
        pb.set_message(format!("{} MB copied", copied / 1_000_000));
    }
}
