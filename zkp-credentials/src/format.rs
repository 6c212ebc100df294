//! Credential formats, named by their OpenID4VP identifiers.
use crate::{codec::CredentialCodec, mdoc::MdocCodec, sdjwt::SdJwtCodec, Error};
use serde::*;
use std::{fmt, str::FromStr};

/// A credential format the protocol recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    /// Selective-disclosure JWT.
    #[serde(rename = "vc+sd-jwt", alias = "dc+sd-jwt")]
    SdJwt,
    /// ISO 18013-5 mobile document.
    #[serde(rename = "mso_mdoc")]
    MsoMdoc,
    /// W3C credential as a plain JWT. Not implemented.
    #[serde(rename = "jwt_vc_json")]
    JwtVcJson,
    /// W3C credential with a linked-data proof. Not implemented.
    #[serde(rename = "ldp_vc")]
    LdpVc,
}

static SD_JWT: SdJwtCodec = SdJwtCodec;
static MDOC: MdocCodec = MdocCodec;

impl Format {
    /// The OpenID4VP identifier of this format.
    pub fn identifier(self) -> &'static str {
        match self {
            Format::SdJwt => "vc+sd-jwt",
            Format::MsoMdoc => "mso_mdoc",
            Format::JwtVcJson => "jwt_vc_json",
            Format::LdpVc => "ldp_vc",
        }
    }

    /// The codec for this format. Fails with [`Error::FormatNotImplemented`] for formats that
    /// are recognized but cannot be transformed.
    pub fn codec(self) -> Result<&'static dyn CredentialCodec, Error> {
        match self {
            Format::SdJwt => Ok(&SD_JWT),
            Format::MsoMdoc => Ok(&MDOC),
            Format::JwtVcJson | Format::LdpVc => Err(Error::FormatNotImplemented(self)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vc+sd-jwt" | "dc+sd-jwt" => Ok(Format::SdJwt),
            "mso_mdoc" => Ok(Format::MsoMdoc),
            "jwt_vc_json" => Ok(Format::JwtVcJson),
            "ldp_vc" => Ok(Format::LdpVc),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}
