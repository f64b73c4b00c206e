//! Error types for backdrop.
//!
//! Configuration problems are reported once, when a component is built.
//! A missing graphics adapter is not fatal: callers pick the static
//! fallback instead. [`GpuError`] covers setting up a window surface.

use std::fmt;

/// Errors raised while building or loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A count, size or interval that must be greater than zero was zero or negative.
    NonPositive { field: &'static str },
    /// A floating point option was NaN or infinite.
    NotFinite { field: &'static str },
    /// A size or product of sizes exceeded what the component can index.
    TooLarge { field: &'static str, max: u64 },
    /// Failed to read or write a config file.
    Io(std::io::Error),
    /// Config file was not valid JSON for this schema.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositive { field } => {
                write!(f, "Invalid config: `{}` must be greater than zero", field)
            }
            ConfigError::NotFinite { field } => {
                write!(f, "Invalid config: `{}` must be a finite number", field)
            }
            ConfigError::TooLarge { field, max } => {
                write!(f, "Invalid config: `{}` must be at most {}", field, max)
            }
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Reasons hardware-accelerated rendering is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Only a software rasterizer is available.
    SoftwareOnly(String),
    /// Accelerated rendering was turned off by configuration.
    Disabled,
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityError::NoAdapter => write!(f, "No compatible GPU adapter found"),
            CapabilityError::SoftwareOnly(name) => {
                write!(f, "Only a software adapter is available ({})", name)
            }
            CapabilityError::Disabled => write!(f, "Accelerated rendering disabled by config"),
        }
    }
}

impl std::error::Error for CapabilityError {}

/// Errors raised while setting up a drawing surface.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for the window.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No adapter can present to the surface.
    NoAdapter,
    /// Failed to create the GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No GPU adapter can present to this window"),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Ensures a count-like option is non-zero.
pub(crate) fn require_positive<T: Default + PartialEq>(
    value: T,
    field: &'static str,
) -> Result<(), ConfigError> {
    if value == T::default() {
        Err(ConfigError::NonPositive { field })
    } else {
        Ok(())
    }
}

/// Ensures a float option is finite and strictly positive.
pub(crate) fn require_positive_f32(value: f32, field: &'static str) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert!(require_positive(3u32, "rows").is_ok());
        assert!(matches!(
            require_positive(0u32, "rows"),
            Err(ConfigError::NonPositive { field: "rows" })
        ));
    }

    #[test]
    fn test_require_positive_f32() {
        assert!(require_positive_f32(0.5, "speed").is_ok());
        assert!(matches!(
            require_positive_f32(0.0, "speed"),
            Err(ConfigError::NonPositive { .. })
        ));
        assert!(matches!(
            require_positive_f32(f32::NAN, "speed"),
            Err(ConfigError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_display_names_field() {
        let err = ConfigError::NonPositive { field: "trail_length" };
        assert!(err.to_string().contains("trail_length"));

        let err = ConfigError::TooLarge {
            field: "grid.rows * grid.cols",
            max: 16,
        };
        assert!(err.to_string().contains("at most 16"));
    }
}
