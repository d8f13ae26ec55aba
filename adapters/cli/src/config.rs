//! Generator configuration assembled from built-in defaults, an optional
//! TOML file and command-line overrides.

use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use clap::ValueEnum;
use isogrid_core::{GridParameters, VariantPool, MAX_DIMENSION, MIN_DIMENSION};
use isogrid_rendering::{Color, VariantPalette};
use isogrid_system_sampler::SamplingStrategy;
use serde::Deserialize;

/// Sampling strategy as spelled in flags and configuration files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum SamplingChoice {
    /// Redraw duplicates until enough distinct cells were picked.
    #[default]
    Rejection,
    /// Shuffle the first slots of the cell index range.
    PartialShuffle,
}

impl From<SamplingChoice> for SamplingStrategy {
    fn from(choice: SamplingChoice) -> Self {
        match choice {
            SamplingChoice::Rejection => Self::Rejection,
            SamplingChoice::PartialShuffle => Self::PartialShuffle,
        }
    }
}

/// Named variant with the color it is drawn in.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct VariantConfig {
    pub(crate) name: String,
    pub(crate) color: [u8; 3],
}

impl VariantConfig {
    fn new(name: &str, color: [u8; 3]) -> Self {
        Self {
            name: name.to_owned(),
            color,
        }
    }
}

/// Contents of a configuration file. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) obstacle_count: Option<u32>,
    pub(crate) seed: Option<u64>,
    pub(crate) sampling: Option<SamplingChoice>,
    pub(crate) tile_variants: Option<Vec<VariantConfig>>,
    pub(crate) obstacle_variants: Option<Vec<VariantConfig>>,
}

impl FileConfig {
    /// Reads and parses a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid configuration {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Values supplied on the command line; `None` defers to the file or defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Overrides {
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) obstacle_count: Option<u32>,
    pub(crate) seed: Option<u64>,
    pub(crate) sampling: Option<SamplingChoice>,
}

/// Fully resolved generator configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct GeneratorConfig {
    pub(crate) parameters: GridParameters,
    pub(crate) seed: Option<u64>,
    pub(crate) sampling: SamplingChoice,
    pub(crate) tile_variants: Vec<VariantConfig>,
    pub(crate) obstacle_variants: Vec<VariantConfig>,
}

impl GeneratorConfig {
    /// Merges defaults, file values and overrides, in increasing precedence.
    pub(crate) fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self> {
        let defaults = GridParameters::default();
        let width = overrides.width.or(file.width).unwrap_or(defaults.width());
        let height = overrides.height.or(file.height).unwrap_or(defaults.height());
        let obstacle_count = overrides
            .obstacle_count
            .or(file.obstacle_count)
            .unwrap_or(defaults.obstacle_count());

        let parameters = GridParameters::new(width, height, obstacle_count);
        ensure!(
            parameters.dimensions_in_range(),
            "dimensions must lie within {MIN_DIMENSION}..={MAX_DIMENSION}, got {width}x{height}"
        );

        Ok(Self {
            parameters,
            seed: overrides.seed.or(file.seed),
            sampling: overrides.sampling.or(file.sampling).unwrap_or_default(),
            tile_variants: file.tile_variants.unwrap_or_else(default_tile_variants),
            obstacle_variants: file
                .obstacle_variants
                .unwrap_or_else(default_obstacle_variants),
        })
    }

    pub(crate) fn tile_pool(&self) -> VariantPool {
        pool(&self.tile_variants)
    }

    pub(crate) fn obstacle_pool(&self) -> VariantPool {
        pool(&self.obstacle_variants)
    }

    pub(crate) fn palette(&self) -> VariantPalette {
        VariantPalette::new(colors(&self.tile_variants), colors(&self.obstacle_variants))
    }
}

fn pool(variants: &[VariantConfig]) -> VariantPool {
    VariantPool::from_names(variants.iter().map(|variant| variant.name.as_str()))
}

fn colors(variants: &[VariantConfig]) -> Vec<Color> {
    variants
        .iter()
        .map(|variant| {
            let [red, green, blue] = variant.color;
            Color::from_rgb_u8(red, green, blue)
        })
        .collect()
}

fn default_tile_variants() -> Vec<VariantConfig> {
    vec![
        VariantConfig::new("grass", [98, 158, 76]),
        VariantConfig::new("meadow", [122, 176, 84]),
        VariantConfig::new("sand", [214, 192, 132]),
        VariantConfig::new("stone", [142, 142, 150]),
    ]
}

fn default_obstacle_variants() -> Vec<VariantConfig> {
    vec![
        VariantConfig::new("rock", [104, 100, 112]),
        VariantConfig::new("tree", [54, 112, 60]),
        VariantConfig::new("crate", [150, 104, 60]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_a_ten_by_ten_grid_with_two_obstacles() {
        let config = GeneratorConfig::resolve(FileConfig::default(), Overrides::default())
            .expect("defaults are valid");

        assert_eq!(config.parameters, GridParameters::new(10, 10, 2));
        assert_eq!(config.sampling, SamplingChoice::Rejection);
        assert_eq!(config.seed, None);
        assert_eq!(config.tile_pool().len(), 4);
        assert_eq!(config.obstacle_pool().len(), 3);
    }

    #[test]
    fn overrides_take_precedence_over_the_file() {
        let file = FileConfig::parse(
            r#"
            width = 4
            height = 6
            obstacle_count = 5
            seed = 11
            sampling = "partial-shuffle"

            [[tile_variants]]
            name = "snow"
            color = [240, 240, 250]
            "#,
        )
        .expect("valid file");
        let overrides = Overrides {
            height: Some(3),
            seed: Some(99),
            ..Overrides::default()
        };

        let config = GeneratorConfig::resolve(file, overrides).expect("valid configuration");

        assert_eq!(config.parameters, GridParameters::new(4, 3, 5));
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.sampling, SamplingChoice::PartialShuffle);
        assert_eq!(config.tile_variants, vec![VariantConfig::new("snow", [240, 240, 250])]);
        assert_eq!(config.obstacle_pool().len(), 3, "obstacles fall back to defaults");
    }

    #[test]
    fn out_of_range_dimensions_are_rejected() {
        let file = FileConfig {
            width: Some(16),
            ..FileConfig::default()
        };

        let error = GeneratorConfig::resolve(file, Overrides::default())
            .expect_err("width above the maximum must fail");
        assert!(error.to_string().contains("2..=15"), "{error}");
    }

    #[test]
    fn unknown_fields_are_reported() {
        assert!(FileConfig::parse("colour = 3").is_err());
    }

    #[test]
    fn palette_follows_variant_order() {
        let config = GeneratorConfig::resolve(FileConfig::default(), Overrides::default())
            .expect("defaults are valid");
        let palette = config.palette();

        assert_eq!(
            palette.color_for(isogrid_core::ElementKind::Tile, isogrid_core::VariantId::new(2)),
            Color::from_rgb_u8(214, 192, 132)
        );
    }
}
