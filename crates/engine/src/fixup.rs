//! Post-composition fix-ups for a car variant
//!
//! After a variant is composed its files still carry the base layer's names.
//! These steps rename the model and sound bank after the variant, point the
//! LOD table at the renamed model and stamp release metadata into the UI
//! file. Every step is independent; a failure becomes a warning.

use crate::error::{Error, Result};
use crate::system::System;
use chrono::NaiveDateTime;
use laminate_config::MetadataValue;
use laminate_core::path::AbsPath;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use std::fmt;

const MODEL_FILE: &str = "model.kn5";
const SFX_DIR: &str = "sfx";
const GUIDS_FILE: &str = "GUIDs.txt";
const LODS_FILE: &str = "lods.ini";
const LOD_SECTION: &str = "[LOD_0]";
const UI_DIR: &str = "ui";
const UI_FILE: &str = "ui_car.json";

/// Timestamp format appended to the UI description
pub const COMPILED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single fix-up step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixupStep {
    /// Rename the single `.kn5` model after the variant
    ModelRename,
    /// Rename the sound bank and rewrite `GUIDs.txt`
    SoundBank,
    /// Point `lods.ini` at the renamed model
    LodTable,
    /// Stamp release metadata into `ui_car.json`
    UiStamp,
}

impl fmt::Display for FixupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ModelRename => "model",
            Self::SoundBank => "sound bank",
            Self::LodTable => "lods",
            Self::UiStamp => "ui",
        })
    }
}

/// What happened to one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixupStatus {
    /// The step changed something
    Applied(String),
    /// Nothing to do for this variant
    Skipped,
    /// The step could not run
    Warning(String),
}

/// Result of one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixupOutcome {
    /// Which step ran
    pub step: FixupStep,
    /// How it went
    pub status: FixupStatus,
}

impl FixupOutcome {
    /// Whether the step ended in a warning
    pub fn is_warning(&self) -> bool {
        matches!(self.status, FixupStatus::Warning(_))
    }
}

/// Runs the fix-ups over composed variant directories
pub struct VariantFixups<'a> {
    system: &'a dyn System,
    version: &'a MetadataValue,
    year: &'a MetadataValue,
    compiled_at: NaiveDateTime,
}

impl<'a> VariantFixups<'a> {
    /// Fix-ups stamping `version`, `year` and `compiled_at`
    pub fn new(
        system: &'a dyn System,
        version: &'a MetadataValue,
        year: &'a MetadataValue,
        compiled_at: NaiveDateTime,
    ) -> Self {
        Self {
            system,
            version,
            year,
            compiled_at,
        }
    }

    /// Run every step over `car_dir`, the composed tree of variant `name`
    pub fn apply(&self, car_dir: &AbsPath, name: &str) -> Vec<FixupOutcome> {
        let steps: [(FixupStep, Result<FixupStatus>); 4] = [
            (FixupStep::ModelRename, self.rename_model(car_dir, name)),
            (FixupStep::SoundBank, self.rename_sound_bank(car_dir, name)),
            (FixupStep::LodTable, self.rewrite_lods(car_dir, name)),
            (FixupStep::UiStamp, self.stamp_ui(car_dir)),
        ];

        steps
            .into_iter()
            .map(|(step, result)| {
                let status = result.unwrap_or_else(|e| FixupStatus::Warning(e.to_string()));
                match &status {
                    FixupStatus::Applied(what) => {
                        tracing::debug!(variant = name, step = %step, "{what}");
                    }
                    FixupStatus::Skipped => {}
                    FixupStatus::Warning(reason) => {
                        tracing::warn!(variant = name, step = %step, reason = %reason, "Fix-up failed");
                    }
                }
                FixupOutcome { step, status }
            })
            .collect()
    }

    fn missing(path: &AbsPath) -> FixupStatus {
        FixupStatus::Warning(format!("{path} not found"))
    }

    /// `model.kn5` becomes `<name>.kn5`
    pub fn rename_model(&self, car_dir: &AbsPath, name: &str) -> Result<FixupStatus> {
        let model = car_dir.join_name(MODEL_FILE);
        if !self.system.is_file(&model) {
            return Ok(Self::missing(&model));
        }

        let renamed = format!("{name}.kn5");
        self.system.rename(&model, &car_dir.join_name(&renamed))?;
        Ok(FixupStatus::Applied(format!("Renamed {MODEL_FILE} to {renamed}")))
    }

    /// The first `sfx/*.bank` becomes `<name>.bank` and `GUIDs.txt` follows
    pub fn rename_sound_bank(&self, car_dir: &AbsPath, name: &str) -> Result<FixupStatus> {
        let sfx = car_dir.join_name(SFX_DIR);
        if !self.system.is_dir(&sfx) {
            return Ok(FixupStatus::Skipped);
        }

        let bank = self
            .system
            .read_dir(&sfx)?
            .into_iter()
            .find(|entry| !entry.is_dir() && entry.name.ends_with(".bank"));
        let Some(bank) = bank else {
            return Ok(FixupStatus::Skipped);
        };

        let old_name = bank
            .name
            .strip_suffix(".bank")
            .unwrap_or(&bank.name)
            .to_string();
        let renamed = format!("{name}.bank");
        if bank.name != renamed {
            self.system
                .rename(&sfx.join_name(&bank.name), &sfx.join_name(&renamed))?;
        }

        let guids = sfx.join_name(GUIDS_FILE);
        if self.system.is_file(&guids) {
            let content = read_text(self.system, &guids)?;
            let updated = rewrite_guids(&content, &old_name, name);
            self.system.write_file(&guids, updated.as_bytes())?;
        }

        Ok(FixupStatus::Applied(format!(
            "Renamed sound bank {} to {renamed}",
            bank.name
        )))
    }

    /// Point every `FILE=` line of `[LOD_0]` in `data/lods.ini` at `<name>.kn5`
    pub fn rewrite_lods(&self, car_dir: &AbsPath, name: &str) -> Result<FixupStatus> {
        let lods = car_dir.join_name("data").join_name(LODS_FILE);
        if !self.system.is_file(&lods) {
            return Ok(Self::missing(&lods));
        }

        let content = read_text(self.system, &lods)?;
        let model = format!("{name}.kn5");
        self.system
            .write_file(&lods, rewrite_lod_table(&content, &model).as_bytes())?;
        Ok(FixupStatus::Applied(format!("Pointed {LOD_SECTION} at {model}")))
    }

    /// Stamp version, year and compile time into `ui/ui_car.json`
    pub fn stamp_ui(&self, car_dir: &AbsPath) -> Result<FixupStatus> {
        let ui = car_dir.join_name(UI_DIR).join_name(UI_FILE);
        if !self.system.is_file(&ui) {
            return Ok(Self::missing(&ui));
        }

        let content = read_text(self.system, &ui)?;
        let mut data: Value =
            serde_json::from_str(content.trim_start_matches('\u{feff}')).map_err(|source| {
                Error::Json {
                    path: ui.clone(),
                    source,
                }
            })?;

        let Some(object) = data.as_object_mut() else {
            return Ok(FixupStatus::Warning(format!(
                "{ui} does not hold a JSON object"
            )));
        };

        object.insert("version".to_string(), self.version.to_json());
        object.insert("year".to_string(), self.year.to_json());

        // The separator is kept even without an existing description
        let stamp = format!(
            "<br><br>Car compiled on {}.",
            self.compiled_at.format(COMPILED_AT_FORMAT)
        );
        let description = match object.get("description") {
            Some(Value::String(text)) => format!("{text}{stamp}"),
            _ => stamp,
        };
        object.insert("description".to_string(), Value::String(description));

        self.system.write_file(&ui, &to_json_bytes(&data, &ui)?)?;
        Ok(FixupStatus::Applied(format!(
            "Stamped version {} ({})",
            self.version, self.year
        )))
    }
}

fn read_text(system: &dyn System, path: &AbsPath) -> Result<String> {
    String::from_utf8(system.read_file(path)?).map_err(|source| Error::InvalidUtf8 {
        path: path.clone(),
        source,
    })
}

fn to_json_bytes(data: &Value, path: &AbsPath) -> Result<Vec<u8>> {
    use serde::Serialize;

    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    data.serialize(&mut serializer).map_err(|source| Error::Json {
        path: path.clone(),
        source,
    })?;
    Ok(out)
}

/// Replace bank and event references from `old` to `new`
fn rewrite_guids(content: &str, old: &str, new: &str) -> String {
    content
        .replace(&format!("bank:/{old}"), &format!("bank:/{new}"))
        .replace(
            &format!("event:/cars/{old}/"),
            &format!("event:/cars/{new}/"),
        )
}

/// Rewrite `FILE=` lines inside `[LOD_0]`, keeping every other byte
fn rewrite_lod_table(content: &str, model: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut in_lod0 = false;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed == LOD_SECTION {
            in_lod0 = true;
        } else if trimmed.starts_with('[') {
            in_lod0 = false;
        } else if in_lod0 && trimmed.starts_with("FILE=") {
            let ending = if line.ends_with("\r\n") {
                "\r\n"
            } else if line.ends_with('\n') {
                "\n"
            } else {
                ""
            };
            out.push_str("FILE=");
            out.push_str(model);
            out.push_str(ending);
            continue;
        }
        out.push_str(line);
    }

    out
}
