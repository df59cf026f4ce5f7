//! WASM-compatible diagnostic types.
//!
//! Kernel errors are converted into diagnostics that name the offending
//! parameter, so the UI can highlight the matching input field.

use boxgen_mesh::MeshError;
use wasm_bindgen::prelude::*;

/// Diagnostic severity for JavaScript.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic message for JavaScript.
///
/// # Examples
/// ```no_run
/// // In JavaScript:
/// // const diag = diagnostics.get(0);
/// // console.log(diag.parameter(), diag.message());
/// ```
#[wasm_bindgen]
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    severity: Severity,
    message: String,
    parameter: Option<String>,
}

#[wasm_bindgen]
impl Diagnostic {
    /// Returns the severity of the diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the diagnostic message.
    pub fn message(&self) -> String {
        self.message.clone()
    }

    /// Returns the camelCase parameter name the diagnostic refers to, if any.
    pub fn parameter(&self) -> Option<String> {
        self.parameter.clone()
    }

    /// Converts this diagnostic to a plain JavaScript object.
    ///
    /// Wrappers cannot be posted between a worker and the main thread; plain
    /// objects can.
    pub fn to_js_object(&self) -> Result<JsValue, JsValue> {
        use js_sys::{Object, Reflect};

        let obj = Object::new();
        Reflect::set(&obj, &JsValue::from_str("severity"), &JsValue::from(self.severity as i32))?;
        Reflect::set(&obj, &JsValue::from_str("message"), &JsValue::from_str(&self.message))?;
        if let Some(parameter) = &self.parameter {
            Reflect::set(&obj, &JsValue::from_str("parameter"), &JsValue::from_str(parameter))?;
        }
        Ok(JsValue::from(obj))
    }
}

impl Diagnostic {
    /// An error diagnostic not tied to a parameter.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            parameter: None,
        }
    }

    /// A warning about one input field.
    pub fn warning(parameter: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            parameter: Some(parameter.to_string()),
        }
    }
}

impl From<MeshError> for Diagnostic {
    fn from(err: MeshError) -> Self {
        Self {
            severity: Severity::Error,
            parameter: err.parameter().map(str::to_string),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{level}: {}", self.message)
    }
}

/// A collection of diagnostics.
#[wasm_bindgen]
pub struct DiagnosticList {
    diagnostics: Vec<Diagnostic>,
}

#[wasm_bindgen]
impl DiagnosticList {
    /// Returns the number of diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns true if there are no diagnostics.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns a diagnostic by index.
    pub fn get(&self, index: usize) -> Option<Diagnostic> {
        self.diagnostics.get(index).cloned()
    }
}

impl DiagnosticList {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

/// Joins diagnostics into the error string thrown to JavaScript.
pub fn to_js_error(diagnostics: &[Diagnostic]) -> JsValue {
    let messages: Vec<String> = diagnostics.iter().map(|d| d.to_string()).collect();
    JsValue::from_str(&messages.join("\n"))
}
