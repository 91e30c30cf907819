use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use dvdvr::process::ifo::Ifo;
use dvdvr::process::label::resolve_label;
use dvdvr::structs::program::ProgramDescriptor;
use dvdvr::structs::program_info::ProgramInfoTable;
use dvdvr::structs::program_set::ProgramSetInfo;
use dvdvr::structs::text::TextEncoding;

use super::command::ReportFormat;

/// Everything the IFO says about the disc, in display form.
#[derive(Debug, Serialize)]
pub struct DiscReport {
    pub format: String,
    pub text_encoding: String,
    pub disc_labels: Vec<String>,
    pub vob_formats: Vec<VobFormatReport>,
    pub program_count: usize,
    pub programs: Vec<ProgramReport>,
}

#[derive(Debug, Serialize)]
pub struct VobFormatReport {
    pub number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoReport>,
    pub audio: Vec<AudioReport>,
}

#[derive(Debug, Serialize)]
pub struct VideoReport {
    pub compression: String,
    pub tv_system: String,
    pub resolution: String,
    pub aspect_ratio: String,
}

#[derive(Debug, Serialize)]
pub struct AudioReport {
    pub channels: u8,
    pub coding: String,
}

#[derive(Debug, Serialize)]
pub struct ProgramReport {
    pub number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vob_format: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub vobus: usize,
    pub size: u64,
}

impl DiscReport {
    pub fn build(
        ifo: &Ifo,
        table: &ProgramInfoTable,
        programs: &[ProgramDescriptor],
        sets: Option<&ProgramSetInfo>,
    ) -> Result<Self> {
        let encoding = ifo.text_encoding()?;

        let vob_formats = table
            .vob_formats
            .iter()
            .enumerate()
            .map(|(i, format)| {
                let video = ifo.video_attributes(format)?;
                let video = video.map(|v| VideoReport {
                    compression: v.compression.to_string(),
                    tv_system: v.tv_system.to_string(),
                    resolution: v.resolution.to_string(),
                    aspect_ratio: v.aspect.to_string(),
                });

                let streams = format.audio_stream_count.clamp(1, 2) as usize;
                let mut audio = Vec::with_capacity(streams);
                for index in 0..streams {
                    if let Some(a) = ifo.audio_attributes(format, index)? {
                        audio.push(AudioReport {
                            channels: a.channels,
                            coding: a.coding.to_string(),
                        });
                    }
                }

                Ok::<_, anyhow::Error>(VobFormatReport {
                    number: i + 1,
                    video,
                    audio,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let programs = programs
            .iter()
            .map(|program| ProgramReport::build(ifo, table, program, sets, encoding))
            .collect::<Result<Vec<_>>>()?;

        let labels = ifo.disc_labels()?;
        Ok(Self {
            format: ifo.root().version.to_string(),
            text_encoding: encoding.to_string(),
            disc_labels: labels.into_iter().filter(|l| !l.is_empty()).collect(),
            vob_formats,
            program_count: table.program_count(),
            programs,
        })
    }

    pub fn write<W: Write>(&self, out: &mut W, format: ReportFormat) -> Result<()> {
        match format {
            ReportFormat::Plain => self.write_plain(out),
            ReportFormat::Yaml => {
                serde_yaml_ng::to_writer(&mut *out, self)?;
                Ok(())
            }
        }
    }

    /// Writes the report as "key: value" lines.
    pub fn write_plain<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "format: {}", self.format)?;
        writeln!(out, "text encoding: {}", self.text_encoding)?;
        for label in &self.disc_labels {
            writeln!(out, "disc label: {label}")?;
        }

        let multi_format = self.vob_formats.len() > 1;
        for format in &self.vob_formats {
            writeln!(out)?;
            if multi_format {
                writeln!(out, "VOB format {}...", format.number)?;
            }
            if let Some(video) = &format.video {
                writeln!(out, "tv_system: {}", video.tv_system)?;
                writeln!(out, "resolution: {}", video.resolution)?;
                writeln!(out, "aspect_ratio: {}", video.aspect_ratio)?;
                writeln!(out, "video_format: {}", video.compression)?;
            }
            for audio in &format.audio {
                writeln!(out, "audio_channels: {}", audio.channels)?;
                writeln!(out, "audio_coding: {}", audio.coding)?;
            }
        }

        writeln!(out)?;
        writeln!(out, "Number of programs: {}", self.program_count)?;

        for program in &self.programs {
            writeln!(out)?;
            program.write_plain(out)?;
        }

        Ok(())
    }
}

impl ProgramReport {
    /// The VOB format id is only shown when the disc declares more than one.
    pub fn build(
        ifo: &Ifo,
        table: &ProgramInfoTable,
        program: &ProgramDescriptor,
        sets: Option<&ProgramSetInfo>,
        encoding: TextEncoding,
    ) -> Result<Self> {
        let format = ifo.vob_format(table, program)?;
        let multi_format = table.vob_formats.len() > 1;
        let label = sets.and_then(|sets| resolve_label(sets, program.number));

        Ok(Self {
            number: program.number,
            vob_format: (multi_format || format.is_none()).then_some(program.vob_format_id),
            label: label.as_ref().map(|l| l.entry.label()),
            title: label.as_ref().map(|l| l.entry.title(encoding)),
            date: program.recorded.map(|t| t.to_string()),
            vobus: program.vobu_map.vobu_count(),
            size: program.vobu_map.total_bytes(),
        })
    }

    pub fn write_plain<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "num: {}", self.number)?;
        if let Some(format) = self.vob_format {
            writeln!(out, "vob format: {format}")?;
        }
        match (&self.label, &self.title) {
            (Some(label), Some(title)) => {
                writeln!(out, "label: {label}")?;
                writeln!(out, "title: {title}")?;
            }
            _ => writeln!(out, "label: not found")?,
        }
        writeln!(out, "date: {}", self.date.as_deref().unwrap_or("not set"))?;
        writeln!(out, "size: {}", self.size)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dvdvr::fixture::{IfoBuilder, ProgramFixture};
    use log::LevelFilter;

    fn program(label: Option<&str>) -> ProgramReport {
        ProgramReport {
            number: 3,
            vob_format: None,
            label: label.map(str::to_string),
            title: label.map(|_| "Beach day".to_string()),
            date: Some("2024-03-05 14:30:45".to_string()),
            vobus: 3,
            size: 71680,
        }
    }

    #[test]
    fn plain_program_lines() -> Result<()> {
        let mut out = Vec::new();
        program(Some("Holiday")).write_plain(&mut out)?;
        assert_eq!(
            String::from_utf8(out)?,
            "num: 3\nlabel: Holiday\ntitle: Beach day\ndate: 2024-03-05 14:30:45\nsize: 71680\n"
        );
        Ok(())
    }

    #[test]
    fn missing_label_is_reported() -> Result<()> {
        let mut out = Vec::new();
        program(None).write_plain(&mut out)?;
        assert!(String::from_utf8(out)?.contains("label: not found\n"));
        Ok(())
    }

    #[test]
    fn yaml_skips_absent_fields() -> Result<()> {
        let report = DiscReport {
            format: "DVD-VR V1.1".to_string(),
            text_encoding: "ASCII".to_string(),
            disc_labels: vec!["TEST DISC".to_string()],
            vob_formats: Vec::new(),
            program_count: 1,
            programs: vec![program(None)],
        };

        let mut out = Vec::new();
        report.write(&mut out, ReportFormat::Yaml)?;
        let yaml = String::from_utf8(out)?;

        assert!(yaml.contains("format: DVD-VR V1.1"));
        assert!(yaml.contains("size: 71680"));
        assert!(!yaml.contains("label:"));
        Ok(())
    }

    #[test]
    fn multiple_vob_formats() -> Result<()> {
        let image = IfoBuilder::default()
            .vob_format(0x5400, [0x00, 0x01, 0x00])
            .program(ProgramFixture::new(0, &[10]))
            .program(ProgramFixture::new(10, &[10]).vob_format_id(2))
            .build();
        let ifo = Ifo::from_bytes(image.data)?;
        let table = ifo.program_info_table()?;
        let programs = [ifo.program(&table, 1)?, ifo.program(&table, 2)?];

        let report = DiscReport::build(&ifo, &table, &programs, None)?;
        let mut out = Vec::new();
        report.write_plain(&mut out)?;
        let text = String::from_utf8(out)?;

        let ntsc = "VOB format 1...\ntv_system: NTSC\nresolution: 720x480\n";
        let pal = "VOB format 2...\ntv_system: PAL\nresolution: 720x576\naspect_ratio: 16:9\n";
        assert!(text.contains(ntsc));
        assert!(text.contains(pal));
        assert!(text.contains("num: 1\nvob format: 1\n"));
        assert!(text.contains("num: 2\nvob format: 2\n"));
        Ok(())
    }

    #[test]
    fn single_vob_format_is_not_listed() -> Result<()> {
        let image = IfoBuilder::default()
            .program(ProgramFixture::new(0, &[10]))
            .build();
        let ifo = Ifo::from_bytes(image.data)?;
        let table = ifo.program_info_table()?;
        let programs = [ifo.program(&table, 1)?];

        let report = DiscReport::build(&ifo, &table, &programs, None)?;
        let mut out = Vec::new();
        report.write_plain(&mut out)?;
        let text = String::from_utf8(out)?;

        assert!(!text.contains("VOB format"));
        assert!(!text.contains("vob format"));
        Ok(())
    }

    #[test]
    fn missing_vob_format_fails_strict() -> Result<()> {
        let image = IfoBuilder::default()
            .program(ProgramFixture::new(0, &[10]).vob_format_id(4))
            .build();
        let mut ifo = Ifo::from_bytes(image.data)?;
        let table = ifo.program_info_table()?;
        let program = ifo.program(&table, 1)?;
        let encoding = ifo.text_encoding()?;

        let report = ProgramReport::build(&ifo, &table, &program, None, encoding)?;
        assert_eq!(report.vob_format, Some(4));

        ifo.set_fail_level(LevelFilter::Warn);
        assert!(ProgramReport::build(&ifo, &table, &program, None, encoding).is_err());
        Ok(())
    }
}
