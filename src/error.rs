use std::{collections::BTreeMap, fmt, io, sync::Arc};

/// Application-level error: a stable key, ordered arguments and the chain of causes.
#[derive(Debug, Clone)]
pub struct VizError {
    pub key: &'static str,
    pub args: BTreeMap<&'static str, String>,
    pub causes: Vec<VizCause>,
}

#[derive(Debug, Clone)]
pub enum VizCause {
    Viz(Box<VizError>),
    Std(Arc<dyn std::error::Error + Send + Sync>),
}

impl VizError {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            args: BTreeMap::new(),
            causes: Vec::new(),
        }
    }

    pub fn with_arg(mut self, k: &'static str, v: impl ToString) -> Self {
        self.args.insert(k, v.to_string());
        self
    }

    pub fn push_viz(mut self, cause: VizError) -> Self {
        self.causes.push(VizCause::Viz(Box::new(cause)));
        self
    }

    pub fn push_std(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.causes.push(VizCause::Std(Arc::new(cause)));
        self
    }
}

impl fmt::Display for VizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.key)?;
        let mut first = true;
        for (k, v) in &self.args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")?;
        for cause in &self.causes {
            match cause {
                VizCause::Viz(e) => write!(f, ": {e}")?,
                VizCause::Std(e) => write!(f, ": {e}")?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for VizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes.iter().find_map(|c| match c {
            VizCause::Viz(e) => Some(e.as_ref() as &dyn std::error::Error),
            VizCause::Std(e) => Some(e.as_ref() as &(dyn std::error::Error + 'static)),
        })
    }
}

/// A configured value that cannot drive the camera.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("{name}: expected max > min > 0, got min={min} max={max}")]
    InvalidRange {
        name: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("fov {0} degrees is outside (0, 180)")]
    FovOutOfRange(f32),
}

/// A body catalog that cannot be turned into a world.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog contains no bodies")]
    Empty,
    #[error("body `{0}` appears more than once")]
    DuplicateName(String),
    #[error("body `{body}` orbits unknown parent `{parent}`")]
    UnknownParent { body: String, parent: String },
    #[error("body `{body}` has non-positive display radius {radius}")]
    NonPositiveRadius { body: String, radius: f32 },
    #[error("lagrange pair `{primary}`/`{secondary}` names an unknown body")]
    UnknownLagrangePair { primary: String, secondary: String },
}

impl From<io::Error> for VizError {
    fn from(err: io::Error) -> Self {
        VizError::new("io-error").push_std(err)
    }
}

impl From<serde_json::Error> for VizError {
    fn from(err: serde_json::Error) -> Self {
        VizError::new("catalog-json")
            .with_arg("line", err.line())
            .push_std(err)
    }
}

impl From<SettingsError> for VizError {
    fn from(err: SettingsError) -> Self {
        VizError::new("settings-invalid").push_std(err)
    }
}

impl From<CatalogError> for VizError {
    fn from(err: CatalogError) -> Self {
        VizError::new("catalog-invalid").push_std(err)
    }
}

impl From<wgpu::CreateSurfaceError> for VizError {
    fn from(err: wgpu::CreateSurfaceError) -> Self {
        VizError::new("wgpu::CreateSurfaceError").push_std(err)
    }
}

impl From<wgpu::RequestAdapterError> for VizError {
    fn from(err: wgpu::RequestAdapterError) -> Self {
        VizError::new("wgpu::RequestAdapterError").push_std(err)
    }
}

impl From<wgpu::RequestDeviceError> for VizError {
    fn from(err: wgpu::RequestDeviceError) -> Self {
        VizError::new("wgpu::RequestDeviceError").push_std(err)
    }
}

impl From<winit::error::OsError> for VizError {
    fn from(err: winit::error::OsError) -> Self {
        VizError::new("winit::error::OsError").push_std(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_args_and_causes() {
        let err = VizError::new("catalog-invalid")
            .with_arg("path", "a.json")
            .push_std(CatalogError::Empty);
        assert_eq!(
            err.to_string(),
            "catalog-invalid(path=a.json): catalog contains no bodies"
        );
    }

    #[test]
    fn source_is_first_cause() {
        use std::error::Error;
        let err: VizError = SettingsError::FovOutOfRange(190.0).into();
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("fov 190 degrees is outside (0, 180)"));
    }
}
