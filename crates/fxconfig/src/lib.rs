use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// 8-bit RGB colour written as `#RRGGBB` in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_color(&value)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

fn parse_color(raw: &str) -> Result<Rgb, String> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix('#')
        .ok_or_else(|| format!("invalid colour '{trimmed}'; expected #RRGGBB"))?;
    if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(format!("invalid colour '{trimmed}'; expected #RRGGBB"));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|err| format!("invalid colour '{trimmed}': {err}"))
    };
    Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

pub const VIOLET: Rgb = Rgb::new(139, 92, 246);
pub const CYAN: Rgb = Rgb::new(6, 182, 212);

/// Every tunable of the page effects. All sections are optional and default
/// to the values the page was designed with.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FxConfig {
    pub version: u32,
    #[serde(default)]
    pub particles: ParticleSettings,
    #[serde(default)]
    pub connections: ConnectionSettings,
    #[serde(default)]
    pub repulsion: RepulsionSettings,
    #[serde(default)]
    pub trail: TrailSettings,
    #[serde(default)]
    pub cursor: CursorSettings,
    #[serde(default)]
    pub parallax: ParallaxSettings,
    #[serde(default)]
    pub tilt: TiltSettings,
    #[serde(default)]
    pub magnetic: MagneticSettings,
    #[serde(default)]
    pub reveal: RevealSettings,
    #[serde(default)]
    pub skills: SkillSettings,
    #[serde(default)]
    pub typing: TypingSettings,
    #[serde(default)]
    pub scroll: ScrollSettings,
    #[serde(default)]
    pub resize: ResizeSettings,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            version: 1,
            particles: ParticleSettings::default(),
            connections: ConnectionSettings::default(),
            repulsion: RepulsionSettings::default(),
            trail: TrailSettings::default(),
            cursor: CursorSettings::default(),
            parallax: ParallaxSettings::default(),
            tilt: TiltSettings::default(),
            magnetic: MagneticSettings::default(),
            reveal: RevealSettings::default(),
            skills: SkillSettings::default(),
            typing: TypingSettings::default(),
            scroll: ScrollSettings::default(),
            resize: ResizeSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParticleSettings {
    pub count: usize,
    /// Upper bound of each velocity component, in pixels per frame.
    pub max_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_opacity: f32,
    pub max_opacity: f32,
    pub color: Rgb,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            count: 80,
            max_speed: 0.25,
            min_radius: 1.0,
            max_radius: 3.0,
            min_opacity: 0.2,
            max_opacity: 0.7,
            color: VIOLET,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionSettings {
    pub max_distance: f32,
    pub max_alpha: f32,
    pub line_width: f32,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            max_distance: 150.0,
            max_alpha: 0.2,
            line_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RepulsionSettings {
    pub radius: f32,
    pub strength: f32,
}

impl Default for RepulsionSettings {
    fn default() -> Self {
        Self {
            radius: 100.0,
            strength: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrailSettings {
    pub cap: usize,
    /// Life lost per frame; particles start with a life of 1.
    pub life_decay: f32,
    /// Upward drift per frame, in pixels.
    pub rise: f32,
    pub opacity: f32,
    pub min_size: f32,
    pub max_size: f32,
    pub color: Rgb,
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self {
            cap: 5,
            life_decay: 0.02,
            rise: 1.0,
            opacity: 0.8,
            min_size: 2.0,
            max_size: 5.0,
            color: CYAN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CursorSettings {
    pub smoothing: f32,
    pub ring_radius: f32,
    pub color: Rgb,
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self {
            smoothing: 0.15,
            ring_radius: 18.0,
            color: VIOLET,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParallaxSettings {
    pub smoothing: f32,
    /// Full swing of the shared offset across the viewport, in pixels.
    pub amplitude: f32,
    /// Multiplier increment per blob; blob `i` moves `(i + 1) * step` times the offset.
    pub blob_step: f32,
    pub blob_radius: f32,
    pub blob_opacity: f32,
    pub blob_colors: Vec<Rgb>,
}

impl Default for ParallaxSettings {
    fn default() -> Self {
        Self {
            smoothing: 0.05,
            amplitude: 30.0,
            blob_step: 0.5,
            blob_radius: 220.0,
            blob_opacity: 0.12,
            blob_colors: vec![VIOLET, CYAN, VIOLET],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TiltSettings {
    pub divisor: f32,
    pub perspective: f32,
    pub hover_scale: f32,
}

impl Default for TiltSettings {
    fn default() -> Self {
        Self {
            divisor: 25.0,
            perspective: 1000.0,
            hover_scale: 1.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MagneticSettings {
    pub max_distance: f32,
    pub strength: f32,
    pub hover_scale: f32,
}

impl Default for MagneticSettings {
    fn default() -> Self {
        Self {
            max_distance: 80.0,
            strength: 0.3,
            hover_scale: 1.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RevealSettings {
    pub threshold: f32,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub stagger: Duration,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            threshold: 0.15,
            stagger: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SkillSettings {
    pub threshold: f32,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub delay: Duration,
}

impl Default for SkillSettings {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            delay: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TypingSettings {
    pub text: String,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub start_delay: Duration,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub type_delay: Duration,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub delete_delay: Duration,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub pause: Duration,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub restart_delay: Duration,
}

impl Default for TypingSettings {
    fn default() -> Self {
        Self {
            text: "Faisal Ahmed".to_string(),
            start_delay: Duration::from_millis(1000),
            type_delay: Duration::from_millis(150),
            delete_delay: Duration::from_millis(100),
            pause: Duration::from_millis(2000),
            restart_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrollSettings {
    pub navbar_offset: f32,
    pub back_to_top_offset: f32,
    /// Fraction of the hero height after which the hollow title is filled.
    pub hollow_fill_ratio: f32,
    /// Distance below the scroll position used to pick the active section.
    pub section_probe: f32,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            navbar_offset: 100.0,
            back_to_top_offset: 500.0,
            hollow_fill_ratio: 0.2,
            section_probe: 150.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResizeSettings {
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub debounce: Duration,
}

impl Default for ResizeSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(250),
        }
    }
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v.trim())
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl FxConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: FxConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        let particles = &self.particles;
        if particles.count == 0 {
            return Err(ConfigError::Invalid(
                "particles.count must be greater than zero".into(),
            ));
        }
        require_non_negative("particles.max_speed", particles.max_speed)?;
        require_positive("particles.min_radius", particles.min_radius)?;
        require_ordered(
            "particles.min_radius",
            particles.min_radius,
            "particles.max_radius",
            particles.max_radius,
        )?;
        require_unit("particles.min_opacity", particles.min_opacity)?;
        require_unit("particles.max_opacity", particles.max_opacity)?;
        require_ordered(
            "particles.min_opacity",
            particles.min_opacity,
            "particles.max_opacity",
            particles.max_opacity,
        )?;

        require_positive("connections.max_distance", self.connections.max_distance)?;
        require_unit("connections.max_alpha", self.connections.max_alpha)?;
        require_positive("connections.line_width", self.connections.line_width)?;

        require_positive("repulsion.radius", self.repulsion.radius)?;
        require_non_negative("repulsion.strength", self.repulsion.strength)?;

        let trail = &self.trail;
        require_positive("trail.life_decay", trail.life_decay)?;
        require_unit("trail.opacity", trail.opacity)?;
        require_positive("trail.min_size", trail.min_size)?;
        require_ordered(
            "trail.min_size",
            trail.min_size,
            "trail.max_size",
            trail.max_size,
        )?;

        require_smoothing("cursor.smoothing", self.cursor.smoothing)?;
        require_positive("cursor.ring_radius", self.cursor.ring_radius)?;

        require_smoothing("parallax.smoothing", self.parallax.smoothing)?;
        require_non_negative("parallax.amplitude", self.parallax.amplitude)?;
        require_unit("parallax.blob_opacity", self.parallax.blob_opacity)?;

        require_positive("tilt.divisor", self.tilt.divisor)?;
        require_positive("tilt.perspective", self.tilt.perspective)?;
        require_positive("magnetic.max_distance", self.magnetic.max_distance)?;

        require_threshold("reveal.threshold", self.reveal.threshold)?;
        require_threshold("skills.threshold", self.skills.threshold)?;

        if self.typing.text.trim().is_empty() {
            return Err(ConfigError::Invalid("typing.text must not be empty".into()));
        }
        if self.typing.type_delay.is_zero() || self.typing.delete_delay.is_zero() {
            return Err(ConfigError::Invalid(
                "typing delays must be greater than zero".into(),
            ));
        }

        require_non_negative("scroll.navbar_offset", self.scroll.navbar_offset)?;
        require_non_negative("scroll.back_to_top_offset", self.scroll.back_to_top_offset)?;
        require_unit("scroll.hollow_fill_ratio", self.scroll.hollow_fill_ratio)?;

        Ok(())
    }
}

fn require_positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be greater than zero (got {value})"
        )))
    }
}

fn require_non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be >= 0 (got {value})")))
    }
}

fn require_unit(name: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be within [0, 1] (got {value})"
        )))
    }
}

fn require_threshold(name: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be within (0, 1] (got {value})"
        )))
    }
}

fn require_smoothing(name: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be strictly between 0 and 1 (got {value})"
        )))
    }
}

fn require_ordered(low_name: &str, low: f32, high_name: &str, high: f32) -> Result<(), ConfigError> {
    if low <= high {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{low_name} ({low}) must not exceed {high_name} ({high})"
        )))
    }
}
