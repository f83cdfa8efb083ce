//! Collection and index configuration
//!
//! Options carry their defaults from construction (`Default` impls and
//! `#[serde(default)]`), so a payload built from them never depends on
//! call-time fallbacks. The HNSW and quantization structs serialize directly
//! into the engine's collection-configuration grammar.

use serde::{Deserialize, Serialize};

// ============================================================================
// HNSW
// ============================================================================

/// HNSW index parameters for the dense vector space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswConfig {
    /// Max connections per node (default: 16)
    pub m: u32,
    /// Build-time beam width (default: 100)
    pub ef_construct: u32,
    /// Below this many points the engine scans instead of walking the graph
    /// (default: 10000)
    pub full_scan_threshold: u32,
    /// Keep the graph on disk instead of in RAM (default: false)
    pub on_disk: bool,
}

impl Default for HnswConfig {
    fn default() -> Self {
        HnswConfig {
            m: 16,
            ef_construct: 100,
            full_scan_threshold: 10_000,
            on_disk: false,
        }
    }
}

impl HnswConfig {
    /// Builder: set `m`
    pub fn with_m(mut self, m: u32) -> Self {
        self.m = m;
        self
    }

    /// Builder: set `ef_construct`
    pub fn with_ef_construct(mut self, ef_construct: u32) -> Self {
        self.ef_construct = ef_construct;
        self
    }

    /// Builder: set `full_scan_threshold`
    pub fn with_full_scan_threshold(mut self, threshold: u32) -> Self {
        self.full_scan_threshold = threshold;
        self
    }

    /// Builder: set `on_disk`
    pub fn with_on_disk(mut self, on_disk: bool) -> Self {
        self.on_disk = on_disk;
        self
    }
}

// ============================================================================
// Quantization
// ============================================================================

/// Element type for scalar quantization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    /// 8-bit signed integers
    #[default]
    Int8,
}

/// Scalar (int8) quantization settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalarQuantization {
    /// Quantized element type
    #[serde(rename = "type")]
    pub kind: ScalarType,
    /// Quantile used to clip outliers before quantizing (default: 0.99)
    pub quantile: f32,
    /// Keep quantized vectors in RAM (default: true)
    pub always_ram: bool,
}

impl Default for ScalarQuantization {
    fn default() -> Self {
        ScalarQuantization {
            kind: ScalarType::Int8,
            quantile: 0.99,
            always_ram: true,
        }
    }
}

/// Binary quantization settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryQuantization {
    /// Keep quantized vectors in RAM (default: true)
    pub always_ram: bool,
}

impl Default for BinaryQuantization {
    fn default() -> Self {
        BinaryQuantization { always_ram: true }
    }
}

/// Quantization mode for the dense vector space.
///
/// Serializes as `{"scalar": {...}}` or `{"binary": {...}}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantizationConfig {
    /// int8 scalar quantization
    Scalar(ScalarQuantization),
    /// 1-bit binary quantization
    Binary(BinaryQuantization),
}

impl QuantizationConfig {
    /// Scalar quantization with the given quantile
    pub fn scalar(quantile: f32, always_ram: bool) -> Self {
        QuantizationConfig::Scalar(ScalarQuantization {
            kind: ScalarType::Int8,
            quantile,
            always_ram,
        })
    }

    /// Binary quantization
    pub fn binary(always_ram: bool) -> Self {
        QuantizationConfig::Binary(BinaryQuantization { always_ram })
    }
}

// ============================================================================
// Sparse index
// ============================================================================

/// Storage datatype for the sparse index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SparseDatatype {
    /// 32-bit floats
    Float32,
    /// 16-bit floats
    Float16,
    /// 8-bit unsigned integers
    Uint8,
}

/// Index settings for the lexical vector space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparseIndexConfig {
    /// Keep the sparse index on disk (default: true)
    pub on_disk: bool,
    /// Optional storage datatype; the engine default applies when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<SparseDatatype>,
}

impl Default for SparseIndexConfig {
    fn default() -> Self {
        SparseIndexConfig {
            on_disk: true,
            datatype: None,
        }
    }
}

// ============================================================================
// Collection options
// ============================================================================

/// Whether a collection carries a lexical vector space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// One unnamed dense vector space
    DenseOnly,
    /// Named dense space plus named sparse space
    Hybrid,
}

impl CollectionKind {
    /// Stable label for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::DenseOnly => "dense",
            CollectionKind::Hybrid => "hybrid",
        }
    }
}

/// Options for collection creation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionOptions {
    /// HNSW parameters for the dense space
    pub hnsw: HnswConfig,
    /// Optional quantization of the dense space
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantization: Option<QuantizationConfig>,
    /// Sparse index settings (hybrid collections only)
    pub sparse: SparseIndexConfig,
}

impl CollectionOptions {
    /// Builder: set HNSW parameters
    pub fn with_hnsw(mut self, hnsw: HnswConfig) -> Self {
        self.hnsw = hnsw;
        self
    }

    /// Builder: enable quantization
    pub fn with_quantization(mut self, quantization: QuantizationConfig) -> Self {
        self.quantization = Some(quantization);
        self
    }

    /// Builder: set sparse index settings
    pub fn with_sparse(mut self, sparse: SparseIndexConfig) -> Self {
        self.sparse = sparse;
        self
    }
}
