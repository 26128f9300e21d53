use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::{DomainError, DomainResult};

/// Etiqueta para cualquier clase sin fantasma asignado.
pub const DEFAULT_GHOST: &str = "Unknown Specter";

/// Mapeo de índices de clase del detector a fantasmas tiernos.
/// Las demás clases se mapean a `DEFAULT_GHOST`.
pub const GHOST_MAPPING: &[(i64, &str)] = &[
    (0, "Fantasma Vagabundo (Persona)"),
    (16, "Minino Espectral (Gato)"),
    (17, "Can Espectral (Perro)"),
    (39, "Poción Olvidada (Botella)"),
    (67, "Grimorio Moderno (Móvil)"),
];

/// Vocabulario del modo simulado. No comparte índices con `GHOST_MAPPING`.
pub const SIMULATED_VOCABULARY: &[&str] = &[
    "Fantasma Sábana",
    "Calabaza Parlante",
    "Murciélago Dormilón",
    "Gato Negro Travieso",
    "Bruja Aprendiz",
    "Vampiro Vegetariano",
    "Momia Desenrollada",
    "Esqueleto Bailarín",
    "Araña Tejedora",
    "Zombi Somnoliento",
    "Búho Hechizado",
    "Caldero Burbujeante",
];

/// Etiqueta temática de la tabla incorporada. Total: nunca falla.
pub fn themed_label(class_id: i64) -> &'static str {
    GHOST_MAPPING
        .iter()
        .find(|(id, _)| *id == class_id)
        .map(|(_, label)| *label)
        .unwrap_or(DEFAULT_GHOST)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeEntry {
    pub class_id: i64,
    pub label: String,
}

/// Tabla de fantasmas por índice de clase, fija tras el arranque.
#[derive(Debug, Clone)]
pub struct ThemeTable {
    labels: HashMap<i64, String>,
    default_label: String,
}

impl ThemeTable {
    pub fn new<I>(entries: I, default_label: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (i64, String)>,
    {
        Self {
            labels: entries.into_iter().collect(),
            default_label: default_label.into(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            GHOST_MAPPING.iter().map(|(id, label)| (*id, label.to_string())),
            DEFAULT_GHOST,
        )
    }

    pub fn themed_label(&self, class_id: i64) -> &str {
        self.labels
            .get(&class_id)
            .map(String::as_str)
            .unwrap_or(&self.default_label)
    }

    pub fn default_label(&self) -> &str {
        &self.default_label
    }

    /// Entradas ordenadas por índice de clase, para mostrarlas en la interfaz.
    pub fn entries(&self) -> Vec<ThemeEntry> {
        let mut out: Vec<ThemeEntry> = self
            .labels
            .iter()
            .map(|(id, label)| ThemeEntry { class_id: *id, label: label.clone() })
            .collect();
        out.sort_by_key(|e| e.class_id);
        out
    }
}

impl Default for ThemeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lista de etiquetas que el detector simulado puede sortear. Nunca vacía.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SimulatedVocabulary(Vec<String>);

impl SimulatedVocabulary {
    pub fn new(labels: Vec<String>) -> DomainResult<Self> {
        if labels.is_empty() {
            return Err(DomainError::InvalidInput(
                "el vocabulario simulado no puede estar vacío".into(),
            ));
        }
        Ok(Self(labels))
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }
}

impl Default for SimulatedVocabulary {
    fn default() -> Self {
        Self(SIMULATED_VOCABULARY.iter().map(|s| s.to_string()).collect())
    }
}
