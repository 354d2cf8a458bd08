use std::fs;
use std::path::PathBuf;

use image::GrayImage;
use tracing::{debug, warn};

/// 中间结果的观察者，引擎在每一步产出中间图时调用
/// 是否挂了观察者不影响识别结果
pub trait ArtifactSink {
    fn on_artifact(&self, name: &str, img: &GrayImage);
}

/// 把中间图存到目录下，name中的'/'作为子目录
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        DirSink { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        let mut path = self.dir.clone();
        path.push(compatible_path_format(name));
        path.set_extension("png");
        path
    }
}

impl ArtifactSink for DirSink {
    fn on_artifact(&self, name: &str, img: &GrayImage) {
        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(?path, %err, "failed to create artifact directory");
                return;
            }
        }
        match img.save(&path) {
            Ok(()) => debug!(?path, "saved artifact"),
            Err(err) => warn!(?path, %err, "failed to save artifact"),
        }
    }
}

/// 路径直接按linux下的写法，自动判断系统类型给出兼容格式
pub fn compatible_path_format(path: &str) -> String {
    let mut img_path = PathBuf::new();
    for part in path.split('/').filter(|p| !p.is_empty()) {
        img_path.push(part);
    }
    img_path.to_string_lossy().into_owned()
}
