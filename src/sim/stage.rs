//! Stage definitions
//!
//! `StageData` mirrors the JSON stage files. It is scaled once from its
//! reference resolution into a `StageBlueprint`, an immutable description
//! that the stage manager instantiates into fresh digits and controllers on
//! every load and reset.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize};

use super::controller::DigitController;
use super::digit::{Digit, DigitGroup, SegmentProperties};
use super::glyph::Segment;
use super::player::WorldBounds;
use crate::consts::{
    DEFAULT_INITIAL_TIME, DEFAULT_KEY_LIFESPAN, LAST_REGULAR_WORLD, STAGES_PER_WORLD,
};
use crate::settings::DisplayConfig;

/// Digits placed above this (scaled) y default to group A
const GROUP_A_AUTO_Y: f32 = -800.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenReference {
    pub width: f32,
    pub height: f32,
}

impl Default for ScreenReference {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Glyph names may be written as strings or bare numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum GlyphRepr {
    Text(String),
    Int(i64),
}

impl From<GlyphRepr> for String {
    fn from(repr: GlyphRepr) -> Self {
        match repr {
            GlyphRepr::Text(s) => s,
            GlyphRepr::Int(n) => n.to_string(),
        }
    }
}

fn glyph_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<GlyphRepr>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|v| v.into_iter().map(String::from).collect()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitInfo {
    #[serde(default = "DigitInfo::default_x")]
    pub x: f32,
    #[serde(default = "DigitInfo::default_y")]
    pub y: f32,
    #[serde(default = "DigitInfo::default_width")]
    pub width: f32,
    #[serde(default = "DigitInfo::default_height")]
    pub height: f32,
    #[serde(default, deserialize_with = "glyph_list")]
    pub sequence: Option<Vec<String>>,
    #[serde(default)]
    pub initial_time: Option<f64>,
    #[serde(default)]
    pub group: Option<DigitGroup>,
}

impl DigitInfo {
    fn default_x() -> f32 {
        300.0
    }
    fn default_y() -> f32 {
        100.0
    }
    fn default_width() -> f32 {
        200.0
    }
    fn default_height() -> f32 {
        400.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnInfo {
    pub x: f32,
    pub y: f32,
    /// Sequence index of the triggering controller
    #[serde(default)]
    pub index: usize,
    #[serde(default = "SpawnInfo::default_number")]
    pub number: u32,
    #[serde(default)]
    pub delay: f64,
    #[serde(default)]
    pub lifespan: Option<f64>,
    /// Which digit's controller triggers this spawn
    #[serde(default)]
    pub digit_index: usize,
}

impl SpawnInfo {
    fn default_number() -> u32 {
        1
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentOverride {
    pub one_way: Option<bool>,
}

/// A stage file as written on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageData {
    pub screen_reference: ScreenReference,
    pub player_start: Option<Point>,
    pub digits: Vec<DigitInfo>,
    /// Legacy: one sequence shared by every digit
    #[serde(deserialize_with = "glyph_list")]
    pub sequence: Option<Vec<String>>,
    pub initial_time_per_number: Option<f64>,
    pub item_spawns: Vec<SpawnInfo>,
    pub world_left: Option<f32>,
    pub world_right: Option<f32>,
    pub world_bottom: Option<f32>,
    pub target_keys: u32,
    pub change_time: f64,
    pub final_stage: bool,
    pub digit_activation_threshold: Option<f32>,
    pub digit_removal_threshold: Option<f32>,
    pub segment_properties_override: HashMap<String, SegmentOverride>,
}

impl Default for StageData {
    fn default() -> Self {
        Self {
            screen_reference: ScreenReference::default(),
            player_start: None,
            digits: Vec::new(),
            sequence: None,
            initial_time_per_number: None,
            item_spawns: Vec::new(),
            world_left: None,
            world_right: None,
            world_bottom: None,
            target_keys: 0,
            change_time: 2.0,
            final_stage: false,
            digit_activation_threshold: None,
            digit_removal_threshold: None,
            segment_properties_override: HashMap::new(),
        }
    }
}

impl StageData {
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading stage {}", path.display()))?;
        let data = Self::from_json(&json)
            .with_context(|| format!("parsing stage {}", path.display()))?;
        log::info!(
            "Loaded stage {} ({} digits, {} spawns)",
            path.display(),
            data.digits.len(),
            data.item_spawns.len()
        );
        Ok(data)
    }

    /// Load a stage, yielding an empty stage on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Failed to load stage: {e:#}");
                Self::default()
            }
        }
    }

    /// Segment properties with this stage's overrides applied
    pub fn segment_properties(&self) -> SegmentProperties {
        let mut props = SegmentProperties::default();
        for (name, ov) in &self.segment_properties_override {
            let (Some(segment), Some(one_way)) = (Segment::from_name(name), ov.one_way) else {
                continue;
            };
            props.one_way[segment.index()] = one_way;
        }
        props
    }

    /// Scale into runtime coordinates
    pub fn blueprint(&self, display: &DisplayConfig) -> StageBlueprint {
        let sx = display.width / self.screen_reference.width;
        let sy = display.height / self.screen_reference.height;
        let scale_x = |v: f32| (v * sx).trunc();
        let scale_y = |v: f32| (v * sy).trunc();

        let start = self.player_start.unwrap_or(Point { x: 400.0, y: 50.0 });
        let player_start = Vec2::new(scale_x(start.x), scale_y(start.y));

        let legacy = self.sequence.as_ref();
        let legacy_time = self.initial_time_per_number.unwrap_or(DEFAULT_INITIAL_TIME);

        let digits = self
            .digits
            .iter()
            .map(|info| {
                let pos = Vec2::new(scale_x(info.x), scale_y(info.y));
                let group = info.group.unwrap_or(if pos.y < GROUP_A_AUTO_Y {
                    DigitGroup::A
                } else {
                    DigitGroup::B
                });
                let sequence = info
                    .sequence
                    .clone()
                    .or_else(|| legacy.cloned())
                    .unwrap_or_default();
                let default_time = if legacy.is_some() {
                    legacy_time
                } else {
                    DEFAULT_INITIAL_TIME
                };
                DigitBlueprint {
                    pos,
                    size: Vec2::new(scale_x(info.width), scale_y(info.height)),
                    sequence,
                    initial_time: info.initial_time.unwrap_or(default_time),
                    group,
                }
            })
            .collect();

        let mut spawns: Vec<SpawnBlueprint> = self
            .item_spawns
            .iter()
            .map(|s| SpawnBlueprint {
                pos: Vec2::new(scale_x(s.x), scale_y(s.y)),
                index: s.index,
                number: s.number,
                delay: s.delay,
                lifespan: s.lifespan.unwrap_or(DEFAULT_KEY_LIFESPAN),
                digit_index: s.digit_index,
            })
            .collect();
        spawns.sort_by_key(|s| s.index);

        let bounds = WorldBounds {
            left: scale_x(self.world_left.unwrap_or(0.0)),
            right: scale_x(self.world_right.unwrap_or(self.screen_reference.width)),
            bottom: scale_y(self.world_bottom.unwrap_or(self.screen_reference.height)),
        };

        let final_stage = self.final_stage.then(|| FinalStage {
            activation_threshold: self.digit_activation_threshold.map(|t| t * sy),
            removal_threshold: self.digit_removal_threshold.map(|t| t * sy),
        });

        StageBlueprint {
            player_start,
            digits,
            spawns,
            bounds,
            target_keys: self.target_keys,
            change_time: self.change_time,
            final_stage,
            properties: self.segment_properties(),
            key_size: display.key_size(),
        }
    }
}

/// One digit as it appears when a stage starts
#[derive(Debug, Clone, PartialEq)]
pub struct DigitBlueprint {
    pub pos: Vec2,
    pub size: Vec2,
    pub sequence: Vec<String>,
    pub initial_time: f64,
    pub group: DigitGroup,
}

impl DigitBlueprint {
    /// Group-A digits start hidden
    pub fn instantiate(&self, properties: SegmentProperties) -> Digit {
        let mut digit = Digit::new(
            self.pos,
            self.size,
            self.sequence.first().map(String::as_str),
            self.group,
            properties,
        );
        digit.active = self.group == DigitGroup::B;
        digit
    }

    pub fn controller(&self, now: f64) -> DigitController {
        DigitController::new(self.sequence.clone(), self.initial_time, now)
    }
}

/// A scheduled key spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnBlueprint {
    pub pos: Vec2,
    pub index: usize,
    pub number: u32,
    pub delay: f64,
    pub lifespan: f64,
    pub digit_index: usize,
}

/// Extra parameters of a final stage (world Y, already scaled)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalStage {
    pub activation_threshold: Option<f32>,
    pub removal_threshold: Option<f32>,
}

/// Scaled, immutable stage description
#[derive(Debug, Clone, PartialEq)]
pub struct StageBlueprint {
    pub player_start: Vec2,
    pub digits: Vec<DigitBlueprint>,
    pub spawns: Vec<SpawnBlueprint>,
    pub bounds: WorldBounds,
    pub target_keys: u32,
    /// Period of the countdown cue cycle (seconds)
    pub change_time: f64,
    pub final_stage: Option<FinalStage>,
    pub properties: SegmentProperties,
    pub key_size: f32,
}

impl StageBlueprint {
    pub fn is_final(&self) -> bool {
        self.final_stage.is_some()
    }
}

/// World/stage numbers, parsed from names like `stage2-3.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageId {
    pub world: u32,
    pub stage: u32,
}

impl StageId {
    pub fn new(world: u32, stage: u32) -> Self {
        Self { world, stage }
    }

    /// The last regular stage, whose clear ends the game
    pub fn is_last(self) -> bool {
        self.world == LAST_REGULAR_WORLD && self.stage == STAGES_PER_WORLD
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let rest = name.strip_prefix("stage")?.strip_suffix(".json")?;
        let (world, stage) = rest.split_once('-')?;
        Some(Self {
            world: world.parse().ok()?,
            stage: stage.parse().ok()?,
        })
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.world, self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../../stages/stage1-1.json");

    fn display_800() -> DisplayConfig {
        DisplayConfig::new(800.0, 600.0)
    }

    #[test]
    fn test_sample_stage_parses() {
        let data = StageData::from_json(SAMPLE).unwrap();
        assert!(!data.digits.is_empty());
        assert!(data.target_keys > 0);
        let bp = data.blueprint(&DisplayConfig::default());
        assert_eq!(bp.digits.len(), data.digits.len());
        assert!(bp.spawns.windows(2).all(|w| w[0].index <= w[1].index));
    }

    #[test]
    fn test_scaling() {
        let data = StageData::from_json(
            r#"{
                "screen_reference": { "width": 400, "height": 300 },
                "player_start": { "x": 10, "y": 20 },
                "digits": [ { "x": 101, "y": 50, "width": 100, "height": 200, "sequence": ["1"] } ],
                "world_bottom": 350
            }"#,
        )
        .unwrap();
        let bp = data.blueprint(&display_800());
        assert_eq!(bp.player_start, Vec2::new(20.0, 40.0));
        assert_eq!(bp.digits[0].pos, Vec2::new(202.0, 100.0));
        assert_eq!(bp.digits[0].size, Vec2::new(200.0, 400.0));
        assert_eq!(bp.bounds.bottom, 700.0);
        assert_eq!(bp.bounds.right, 800.0);
    }

    #[test]
    fn test_legacy_sequence_expands() {
        let data = StageData::from_json(
            r#"{
                "sequence": [1, 2, "A"],
                "initial_time_per_number": 1.5,
                "digits": [ { "x": 0, "y": 0 }, { "x": 300, "y": 0, "sequence": ["8"] } ]
            }"#,
        )
        .unwrap();
        let bp = data.blueprint(&display_800());
        assert_eq!(bp.digits[0].sequence, vec!["1", "2", "A"]);
        assert_eq!(bp.digits[0].initial_time, 1.5);
        assert_eq!(bp.digits[0].size, Vec2::new(200.0, 400.0));
        assert_eq!(bp.digits[1].sequence, vec!["8"]);
    }

    #[test]
    fn test_group_defaults() {
        let data = StageData::from_json(
            r#"{
                "digits": [
                    { "x": 0, "y": -900, "sequence": ["1"] },
                    { "x": 0, "y": 100, "sequence": ["1"] },
                    { "x": 0, "y": 100, "sequence": ["1"], "group": "A" }
                ]
            }"#,
        )
        .unwrap();
        let bp = data.blueprint(&display_800());
        let groups: Vec<_> = bp.digits.iter().map(|d| d.group).collect();
        assert_eq!(groups, vec![DigitGroup::A, DigitGroup::B, DigitGroup::A]);
        let digit = bp.digits[0].instantiate(bp.properties);
        assert!(!digit.active);
    }

    #[test]
    fn test_segment_override() {
        let data = StageData::from_json(
            r#"{ "segment_properties_override": { "B": { "one_way": true }, "Q": { "one_way": true } } }"#,
        )
        .unwrap();
        let props = data.segment_properties();
        assert!(props.one_way(Segment::B));
        assert!(props.one_way(Segment::A));
        assert!(!props.one_way(Segment::C));
    }

    #[test]
    fn test_malformed_stage_defaults() {
        assert!(StageData::from_json("{ not json").is_err());
        let data = StageData::load_or_default(Path::new("/nonexistent/stage9-9.json"));
        assert_eq!(data, StageData::default());
    }

    #[test]
    fn test_stage_id_from_path() {
        let id = StageId::from_path(Path::new("stages/stage4-3.json"));
        assert_eq!(id, Some(StageId::new(4, 3)));
        assert_eq!(StageId::from_path(Path::new("title.json")), None);
        assert_eq!(StageId::new(2, 1).to_string(), "2-1");
        assert!(StageId::new(4, 3).is_last());
        assert!(!StageId::new(3, 3).is_last());
        assert!(!StageId::new(5, 1).is_last());
    }
}
