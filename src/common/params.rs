use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};

/// Coloring strategy understood by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "ACR")]
    Acr,
    #[serde(rename = "ACR_H")]
    AcrH,
    #[serde(rename = "ACR_R")]
    AcrR,
    #[serde(rename = "ACR_RH")]
    AcrRh,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::Acr, Method::AcrH, Method::AcrR, Method::AcrRh];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Acr => "ACR",
            Method::AcrH => "ACR_H",
            Method::AcrR => "ACR_R",
            Method::AcrRh => "ACR_RH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = GatewayError;

    fn from_str(s: &str) -> GatewayResult<Self> {
        Method::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| GatewayError::Validation(format!("unknown coloring method: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColoringParameters {
    pub method: Method,
    /// Color budget.
    pub k: u32,
    /// Locality radius.
    pub r: u32,
}

impl ColoringParameters {
    pub fn new(method: Method, k: u32, r: u32) -> Self {
        Self { method, k, r }
    }

    pub fn validate(&self) -> GatewayResult<()> {
        if self.k < 1 {
            let err = format!("k must be at least 1, got {}", self.k);
            return Err(GatewayError::Validation(err));
        }
        if self.r < 1 {
            let err = format!("r must be at least 1, got {}", self.r);
            return Err(GatewayError::Validation(err));
        }
        Ok(())
    }
}
