use std::path::PathBuf;

use feat2d_cli::{FrameReport, Pipeline, PipelineConfig, PipelineResult};
use feat2d_core::{DescriptorKind, DetectorKind, MatcherKind, SelectorKind};
use log::*;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "feat2d",
    about = "Detect, describe and match 2D keypoints across an image sequence"
)]
struct Opt {
    /// Pipeline settings file (.toml or .json); command line options override it.
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,
    /// SHITOMASI, HARRIS, FAST, BRISK, ORB, AKAZE or SIFT
    #[structopt(short, long)]
    detector: Option<DetectorKind>,
    /// BRISK, BRIEF, ORB, FREAK, AKAZE or SIFT
    #[structopt(short = "D", long)]
    descriptor: Option<DescriptorKind>,
    /// MAT_BF or MAT_FLANN
    #[structopt(short, long)]
    matcher: Option<MatcherKind>,
    /// SEL_NN or SEL_KNN
    #[structopt(short, long)]
    selector: Option<SelectorKind>,
    /// Keep only the strongest keypoints of each frame
    #[structopt(short = "n", long)]
    max_keypoints: Option<usize>,
    /// Keep keypoints from the whole image instead of the preceding-vehicle box
    #[structopt(long)]
    no_roi: bool,
    /// Worker threads for both Rayon and OpenCV
    #[structopt(short = "j", long)]
    threads: Option<usize>,
    /// Write the effective settings to this file (.toml or .json) and exit
    #[structopt(long, parse(from_os_str))]
    dump_config: Option<PathBuf>,
    /// Directory holding the numbered images.
    ///
    /// Defaults to the KITTI layout of the settings file.
    #[structopt(parse(from_os_str))]
    images: Option<PathBuf>,
}

impl Opt {
    fn pipeline_config(&self) -> PipelineResult<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        let mut features = config.features.clone().to_builder();
        if let Some(detector) = self.detector {
            features = features.detector(detector);
        }
        if let Some(descriptor) = self.descriptor {
            features = features.descriptor(descriptor);
        }
        if let Some(matcher) = self.matcher {
            features = features.matcher(matcher);
        }
        if let Some(selector) = self.selector {
            features = features.selector(selector);
        }
        if let Some(n) = self.threads {
            features = features.threads(n);
        }
        config.features = features.build()?;

        if self.max_keypoints.is_some() {
            config.max_keypoints = self.max_keypoints;
        }
        if self.no_roi {
            config.focus_region = false;
        }
        if let Some(dir) = &self.images {
            config.sequence.base_dir = dir.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn run(opt: Opt) -> PipelineResult<()> {
    let config = opt.pipeline_config()?;
    if let Some(path) = &opt.dump_config {
        config.save(path)?;
        info!("wrote settings to {}", path.display());
        return Ok(());
    }

    feat2d_cv::init_threads(config.features.n_threads)?;

    println!("{}", config.features.summary());
    let mut pipeline = Pipeline::new(config)?;
    let summary = pipeline.run(|report: &FrameReport, _| {
        println!("{}", report);
        Ok(())
    })?;
    println!("{}", summary);
    Ok(())
}

fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();
    if let Err(e) = run(opt) {
        error!("{}", e);
        std::process::exit(1);
    }
}
