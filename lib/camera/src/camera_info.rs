use crate::CameraResult;
use nokhwa::{
    query,
    utils::{ApiBackend, CameraIndex},
};

#[derive(Debug, Clone)]
pub struct CameraInfo {
    pub index: String,
    pub name: String,
    pub description: String,
}

pub fn query_available_cameras() -> CameraResult<Vec<CameraInfo>> {
    let cameras = query(ApiBackend::Auto)?;

    Ok(cameras
        .into_iter()
        .map(|camera| CameraInfo {
            index: match camera.index() {
                CameraIndex::Index(index) => index.to_string(),
                CameraIndex::String(name) => name.clone(),
            },
            name: camera.human_name(),
            description: camera.description().to_string(),
        })
        .collect())
}
