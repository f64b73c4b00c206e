//! Graphics capability probing.
//!
//! A probe answers one question: can this environment draw the animated
//! field with hardware acceleration? It has no side effects beyond the
//! query itself.

use std::fmt;

use crate::error::CapabilityError;

/// What a successful probe found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterSummary {
    pub name: String,
    pub backend: String,
}

impl fmt::Display for AdapterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.backend)
    }
}

/// Something that can tell whether accelerated rendering is available.
pub trait CapabilityProbe {
    fn probe(&self) -> Result<AdapterSummary, CapabilityError>;

    fn is_available(&self) -> bool {
        self.probe().is_ok()
    }
}

/// Probe that asks wgpu for an adapter without creating a surface.
#[derive(Debug, Clone)]
pub struct GpuProbe {
    /// Backends to try.
    pub backends: wgpu::Backends,
    /// Accept CPU rasterizers such as llvmpipe or WARP.
    pub allow_software: bool,
}

impl Default for GpuProbe {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::PRIMARY,
            allow_software: false,
        }
    }
}

impl CapabilityProbe for GpuProbe {
    fn probe(&self) -> Result<AdapterSummary, CapabilityError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: self.backends,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or(CapabilityError::NoAdapter)?;

        let info = adapter.get_info();
        if info.device_type == wgpu::DeviceType::Cpu && !self.allow_software {
            return Err(CapabilityError::SoftwareOnly(info.name));
        }

        Ok(AdapterSummary {
            name: info.name,
            backend: format!("{:?}", info.backend),
        })
    }
}

/// Probe with a predetermined answer.
#[derive(Debug, Clone)]
pub struct Forced(pub Result<AdapterSummary, CapabilityError>);

impl Forced {
    /// Always available.
    pub fn available() -> Self {
        Forced(Ok(AdapterSummary {
            name: "forced".into(),
            backend: "none".into(),
        }))
    }

    /// Always unavailable.
    pub fn unavailable() -> Self {
        Forced(Err(CapabilityError::Disabled))
    }
}

impl CapabilityProbe for Forced {
    fn probe(&self) -> Result<AdapterSummary, CapabilityError> {
        self.0.clone()
    }
}
