//! Shared helpers for the service integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request};
use std::sync::Arc;
use tempfile::TempDir;

use sst_api::{AppState, ServiceConfig};
use sst_renderer::{ColorPolicy, GridLayout, RenderConfig, RenderMode, SampleFormat};
use test_utils::{encode_base_png, encode_u8, half_water_rgba, zip_archive};

pub const BOUNDARY: &str = "X-BOUNDARY";

pub const GRID_WIDTH: usize = 4;
pub const GRID_HEIGHT: usize = 2;

/// Samples straddling the threshold bands: cold, warm, hot, cold / warm, hot, cold, warm.
pub const GRID_SAMPLES: [i16; 8] = [10, 40, 70, 20, 35, 61, 0, 59];

/// Builder for `multipart/form-data` request bodies.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body
            .extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, file_name
            )
            .as_bytes(),
        );
        self.body
            .extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body
            .extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        self.body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}

/// `POST /upload` carrying `body`.
pub fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Service config for a small u8 grid rendered at native resolution.
pub fn test_config(work_dir: &TempDir) -> ServiceConfig {
    ServiceConfig {
        render: RenderConfig {
            layout: GridLayout {
                width: GRID_WIDTH,
                height: GRID_HEIGHT,
                format: SampleFormat::U8,
                header_bytes: 0,
                sentinel: Some(-999),
            },
            policy: ColorPolicy::threshold(),
            mode: RenderMode::Full,
            ..RenderConfig::default()
        },
        work_dir: work_dir.path().to_path_buf(),
        ..ServiceConfig::default()
    }
}

pub fn test_state(config: ServiceConfig) -> Arc<AppState> {
    Arc::new(AppState::new(config))
}

/// Base map PNG: left half water, right half land.
pub fn base_map_png() -> Vec<u8> {
    encode_base_png(
        GRID_WIDTH as u32,
        GRID_HEIGHT as u32,
        half_water_rgba(GRID_WIDTH, GRID_HEIGHT),
    )
}

/// Archive holding the test grid as `sst/today.grid`.
pub fn grid_zip() -> Vec<u8> {
    let grid = encode_u8(&GRID_SAMPLES);
    zip_archive(&[
        ("sst/readme.txt", b"daily sst".as_slice()),
        ("sst/today.grid", grid.as_slice()),
    ])
}

/// Number of entries left in the work directory.
pub fn work_dir_entries(work_dir: &TempDir) -> usize {
    std::fs::read_dir(work_dir.path()).unwrap().count()
}
