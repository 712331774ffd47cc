use crate::{ProcessOptions, Result};
use boundary_thinning::ThinParams;
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Smooth KML - Shrink KML area outlines by thinning redundant polygon vertices
pub struct Settings {
    /// KML file to process
    #[clap(value_name = "FILE")]
    pub input: PathBuf,

    /// Output file (default: the input name with `.optimized` before the extension)
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Distance threshold in meters for collapsing clusters of close points
    #[clap(short, long, default_value = "300")]
    pub distance: f64,

    /// Bearing threshold in degrees for collapsing points that keep the heading
    #[clap(short, long, default_value = "3")]
    pub bearing: f64,

    /// Number of passes for both the distance and the bearing run
    #[clap(short, long, default_value = "5")]
    pub passes: usize,

    /// Number of distance passes (overrides --passes)
    #[clap(long)]
    pub distance_passes: Option<usize>,

    /// Number of bearing passes (overrides --passes)
    #[clap(long)]
    pub bearing_passes: Option<usize>,

    /// Placemarks with a smaller `population` value are removed
    #[clap(long, default_value = "800")]
    pub min_population: i64,

    /// JSON file with thinning parameters, replaces the threshold and pass options
    #[clap(
        long,
        value_name = "FILE",
        conflicts_with_all = ["distance", "bearing", "passes", "distance_passes", "bearing_passes"]
    )]
    pub params: Option<PathBuf>,

    /// Keep `Schema` and `ExtendedData` elements
    #[clap(long, default_value = "false")]
    pub keep_extended_data: bool,
}

impl Settings {
    /// Parse the process arguments, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Thinning parameters from the params file or the individual options
    pub fn thin_params(&self) -> Result<ThinParams> {
        if let Some(path) = &self.params {
            let reader = BufReader::new(File::open(path)?);
            return Ok(serde_json::from_reader(reader)?);
        }

        Ok(ThinParams {
            distance_threshold_m: self.distance,
            bearing_threshold_deg: self.bearing,
            distance_passes: self.distance_passes.unwrap_or(self.passes),
            bearing_passes: self.bearing_passes.unwrap_or(self.passes),
        })
    }

    pub fn process_options(&self) -> Result<ProcessOptions> {
        Ok(ProcessOptions {
            params: self.thin_params()?,
            min_population: self.min_population,
            strip_extended_data: !self.keep_extended_data,
        })
    }

    /// Where the result is written
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input))
    }
}

/// `areas.kml.xml` becomes `areas.kml.optimized.xml`
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    match input.extension() {
        Some(ext) => input.with_file_name(format!("{stem}.optimized.{}", ext.to_string_lossy())),
        None => input.with_file_name(format!("{stem}.optimized")),
    }
}
