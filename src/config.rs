use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::{
    model::{DetectorParams, DetectorVariant, ModelId},
    theme::{SimulatedVocabulary, ThemeTable, DEFAULT_GHOST, GHOST_MAPPING},
};

const DEFAULT_ADDR: &str = "0.0.0.0:8090";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_MODEL_NAME: &str = "yolov5s";
const DEFAULT_MODEL_PATH: &str = "models/yolov5s.onnx";
const DEFAULT_SIM_DELAY_MS: u64 = 1200;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    server: Option<ServerConfigFile>,
    detector: Option<DetectorConfigFile>,
    simulation: Option<SimulationConfigFile>,
    theme: Option<ThemeConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ServerConfigFile {
    addr: Option<String>,
    static_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DetectorConfigFile {
    mode: Option<String>,
    model_name: Option<String>,
    model_path: Option<String>,
    preload: Option<bool>,
    input_size: Option<u32>,
    conf_threshold: Option<f32>,
    iou_threshold: Option<f32>,
    max_detections: Option<usize>,
    agnostic_nms: Option<bool>,
    multi_label: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SimulationConfigFile {
    delay_ms: Option<u64>,
    vocabulary: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ThemeConfigFile {
    default_label: Option<String>,
    labels: Option<Vec<ThemeLabelFile>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThemeLabelFile {
    class_id: i64,
    label: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: String,
    pub static_dir: PathBuf,
    pub variant: DetectorVariant,
    pub model: ModelId,
    pub preload: bool,
    pub defaults: DetectorParams,
    pub simulation_delay: Duration,
    pub vocabulary: SimulatedVocabulary,
    pub theme: ThemeTable,
}

impl AppConfig {
    /// Lee `$GHOSTLY_CONFIG` (TOML, opcional) y aplica `GHOSTLY_ADDR`,
    /// `GHOSTLY_MODE` y `GHOSTLY_MODEL` encima.
    pub fn load() -> Result<Self> {
        let file_cfg = match std::env::var("GHOSTLY_CONFIG").ok().as_deref() {
            Some(path) => read_config_file(Path::new(path))?,
            None => ConfigFile::default(),
        };
        resolve(file_cfg, |key| std::env::var(key).ok())
    }

    /// Sólo el fichero, sin variables de entorno.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file_cfg: ConfigFile = toml::from_str(raw).context("parse config toml")?;
        resolve(file_cfg, |_| None)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            variant: DetectorVariant::Onnx,
            model: ModelId {
                name: DEFAULT_MODEL_NAME.to_string(),
                onnx_path: DEFAULT_MODEL_PATH.to_string(),
            },
            preload: false,
            defaults: DetectorParams::default(),
            simulation_delay: Duration::from_millis(DEFAULT_SIM_DELAY_MS),
            vocabulary: SimulatedVocabulary::default(),
            theme: ThemeTable::builtin(),
        }
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parse config file {}", path.display()))
}

fn resolve(file_cfg: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<AppConfig> {
    let mut cfg = AppConfig::default();

    let server = file_cfg.server.unwrap_or_default();
    if let Some(addr) = env("GHOSTLY_ADDR").or(server.addr) {
        cfg.addr = addr;
    }
    if let Some(dir) = server.static_dir {
        cfg.static_dir = dir;
    }

    let det = file_cfg.detector.unwrap_or_default();
    if let Some(mode) = env("GHOSTLY_MODE").or(det.mode) {
        cfg.variant = mode.parse().map_err(|e| anyhow!("{e}"))?;
    }
    if let Some(name) = det.model_name {
        cfg.model.name = name;
    }
    if let Some(path) = env("GHOSTLY_MODEL").or(det.model_path) {
        cfg.model.onnx_path = path;
    }
    cfg.preload = det.preload.unwrap_or(cfg.preload);

    let d = &mut cfg.defaults;
    d.input_size = det.input_size.unwrap_or(d.input_size);
    d.conf_threshold = det.conf_threshold.unwrap_or(d.conf_threshold);
    d.iou_threshold = det.iou_threshold.unwrap_or(d.iou_threshold);
    d.max_detections = det.max_detections.unwrap_or(d.max_detections);
    d.agnostic_nms = det.agnostic_nms.unwrap_or(d.agnostic_nms);
    d.multi_label = det.multi_label.unwrap_or(d.multi_label);
    cfg.defaults
        .validate()
        .map_err(|e| anyhow!("invalid [detector] defaults: {e}"))?;

    let sim = file_cfg.simulation.unwrap_or_default();
    if let Some(ms) = sim.delay_ms {
        cfg.simulation_delay = Duration::from_millis(ms);
    }
    if let Some(labels) = sim.vocabulary {
        cfg.vocabulary = SimulatedVocabulary::new(labels).map_err(|e| anyhow!("invalid [simulation]: {e}"))?;
    }

    let theme = file_cfg.theme.unwrap_or_default();
    let default_label = theme.default_label.unwrap_or_else(|| DEFAULT_GHOST.to_string());
    if default_label.trim().is_empty() {
        bail!("invalid [theme]: default_label must not be empty");
    }
    let entries: Vec<(i64, String)> = match theme.labels {
        Some(labels) => {
            let mut seen = HashSet::new();
            for l in &labels {
                if !seen.insert(l.class_id) {
                    bail!("invalid [theme]: class_id {} listed twice", l.class_id);
                }
            }
            labels.into_iter().map(|l| (l.class_id, l.label)).collect()
        }
        None => GHOST_MAPPING.iter().map(|(id, l)| (*id, l.to_string())).collect(),
    };
    cfg.theme = ThemeTable::new(entries, default_label);

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.addr, DEFAULT_ADDR);
        assert_eq!(cfg.variant, DetectorVariant::Onnx);
        assert_eq!(cfg.model.onnx_path, DEFAULT_MODEL_PATH);
        assert_eq!(cfg.defaults, DetectorParams::default());
        assert_eq!(cfg.simulation_delay, Duration::from_millis(DEFAULT_SIM_DELAY_MS));
        assert_eq!(cfg.theme.themed_label(0), "Fantasma Vagabundo (Persona)");
    }

    #[test]
    fn env_overrides_file_values() {
        let file: ConfigFile = toml::from_str(
            r#"
            [server]
            addr = "127.0.0.1:1"
            [detector]
            mode = "onnx"
            "#,
        )
        .unwrap();
        let cfg = resolve(file, |k| match k {
            "GHOSTLY_ADDR" => Some("127.0.0.1:9999".into()),
            "GHOSTLY_MODE" => Some("simulated".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.addr, "127.0.0.1:9999");
        assert_eq!(cfg.variant, DetectorVariant::Simulated);
    }

    #[test]
    fn theme_and_vocabulary_are_configured_independently() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [simulation]
            delay_ms = 0
            vocabulary = ["Niebla", "Farol"]

            [theme]
            default_label = "Sombra"
            [[theme.labels]]
            class_id = 2
            label = "Carroza Fantasma (Coche)"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.theme.themed_label(2), "Carroza Fantasma (Coche)");
        assert_eq!(cfg.theme.themed_label(0), "Sombra");
        assert_eq!(cfg.vocabulary.labels(), ["Niebla".to_string(), "Farol".to_string()]);
        assert!(cfg.simulation_delay.is_zero());
    }

    #[test]
    fn invalid_values_fail_startup() {
        for raw in [
            "[detector]\nconf_threshold = 1.5",
            "[detector]\nmax_detections = 5",
            "[detector]\nmode = \"ouija\"",
            "[simulation]\nvocabulary = []",
            "[theme]\ndefault_label = \"  \"",
            "[[theme.labels]]\nclass_id = 1\nlabel = \"a\"\n[[theme.labels]]\nclass_id = 1\nlabel = \"b\"",
            "[ghosts]\ncount = 3",
            "[detector]\nconf = 0.3",
            "[simulation]\ndelay = 10",
            "[[theme.labels]]\nclass_id = 1\nlabel = \"a\"\ncolor = \"red\"",
        ] {
            assert!(AppConfig::from_toml_str(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn config_file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ghostly.toml");
        std::fs::write(&path, "[detector]\nmodel_path = \"m/yolo11n.onnx\"\npreload = true\n").unwrap();
        let cfg = resolve(read_config_file(&path).unwrap(), |_| None).unwrap();
        assert_eq!(cfg.model.onnx_path, "m/yolo11n.onnx");
        assert!(cfg.preload);
        assert!(read_config_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn shipped_example_config_is_valid() {
        let cfg = AppConfig::from_toml_str(include_str!("../ghostly.example.toml")).unwrap();
        assert_eq!(cfg.theme.entries().len(), 5);
        assert_eq!(cfg.theme.default_label(), DEFAULT_GHOST);
        assert_eq!(cfg.vocabulary.labels().len(), 5);
    }
}
