//! Error types for Tinsel.
//!
//! Only the photo upload path and viewer startup can fail at runtime.
//! Animation and placement are pure per-frame computation and never return
//! errors.

use std::fmt;

/// Errors that can occur while turning an uploaded file into a polaroid.
#[derive(Debug)]
pub enum PolaroidError {
    /// The file is not a readable image.
    Decode(image::ImageError),
    /// The decoded image has no pixels to draw.
    EmptyImage,
    /// JPEG encoding failed.
    Encode(image::ImageError),
    /// A string that should have been a base64 data URI was not.
    InvalidDataUri(String),
    /// The data URI payload is not valid base64.
    Base64(base64::DecodeError),
    /// Failed to read the file from disk.
    Io(std::io::Error),
}

impl fmt::Display for PolaroidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolaroidError::Decode(e) => write!(f, "Failed to decode image: {}", e),
            PolaroidError::EmptyImage => write!(f, "Image has zero width or height"),
            PolaroidError::Encode(e) => write!(f, "Failed to encode polaroid: {}", e),
            PolaroidError::InvalidDataUri(msg) => write!(f, "Invalid data URI: {}", msg),
            PolaroidError::Base64(e) => write!(f, "Invalid base64 payload: {}", e),
            PolaroidError::Io(e) => write!(f, "Failed to read image file: {}", e),
        }
    }
}

impl std::error::Error for PolaroidError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PolaroidError::Decode(e) => Some(e),
            PolaroidError::Encode(e) => Some(e),
            PolaroidError::Base64(e) => Some(e),
            PolaroidError::Io(e) => Some(e),
            PolaroidError::EmptyImage | PolaroidError::InvalidDataUri(_) => None,
        }
    }
}

impl From<base64::DecodeError> for PolaroidError {
    fn from(e: base64::DecodeError) -> Self {
        PolaroidError::Base64(e)
    }
}

impl From<std::io::Error> for PolaroidError {
    fn from(e: std::io::Error) -> Self {
        PolaroidError::Io(e)
    }
}

/// Errors that can occur when an upload does not reach the store.
#[derive(Debug)]
pub enum UploadError {
    /// The image could not be processed.
    Polaroid(PolaroidError),
    /// The upload worker went away before delivering a result.
    WorkerGone,
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Polaroid(e) => write!(f, "Upload failed: {}", e),
            UploadError::WorkerGone => write!(f, "Upload worker stopped before finishing"),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploadError::Polaroid(e) => Some(e),
            UploadError::WorkerGone => None,
        }
    }
}

impl From<PolaroidError> for UploadError {
    fn from(e: PolaroidError) -> Self {
        UploadError::Polaroid(e)
    }
}

/// Errors that can occur while opening the viewer window and GPU.
#[derive(Debug)]
pub enum ViewerError {
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// Failed to create the GPU surface for the window.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No GPU adapter compatible with the surface was found.
    NoAdapter,
    /// Failed to create the GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            ViewerError::Window(e) => write!(f, "Failed to create window: {}", e),
            ViewerError::SurfaceCreation(e) => write!(f, "Failed to create surface: {}", e),
            ViewerError::NoAdapter => write!(f, "No suitable GPU adapter found"),
            ViewerError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::EventLoop(e) => Some(e),
            ViewerError::Window(e) => Some(e),
            ViewerError::SurfaceCreation(e) => Some(e),
            ViewerError::DeviceCreation(e) => Some(e),
            ViewerError::NoAdapter => None,
        }
    }
}

impl From<winit::error::EventLoopError> for ViewerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ViewerError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for ViewerError {
    fn from(e: winit::error::OsError) -> Self {
        ViewerError::Window(e)
    }
}

impl From<wgpu::CreateSurfaceError> for ViewerError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        ViewerError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for ViewerError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        ViewerError::DeviceCreation(e)
    }
}
