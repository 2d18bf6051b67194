//! Pipe-delimited GWT-RPC request bodies.
//!
//! A body is `7|0|<n>|`, the `n` string-table entries, then the argument
//! tokens, every field terminated by `|`. Tokens refer to string-table
//! entries by 1-based index. The field order and count of both calls are a
//! contract with the portal and must not change.

use std::fmt::Write as _;

use crate::models::PortalConfig;

/// Serialization stream version.
const STREAM_VERSION: u32 = 7;
/// Stream flags.
const STREAM_FLAGS: u32 = 0;

const PLANNING_SERVICE: &str = "com.adesoft.gwt.directplan.client.rpc.MyPlanningClientServiceProxy";
const LOGIN_METHOD: &str = "method1login";
const LOGIN_REQUEST: &str = "com.adesoft.gwt.core.client.rpc.data.LoginRequest/3705388826";
const DIRECT_LOGIN_REQUEST: &str =
    "com.adesoft.gwt.directplan.client.rpc.data.DirectLoginRequest/635437471";

const CORE_SERVICE: &str = "com.adesoft.gwt.core.client.rpc.CorePlanningServiceProxy";
const GENERATED_URL_METHOD: &str = "method11getGeneratedUrl";
const LIST_TYPE: &str = "java.util.List";
const STRING_TYPE: &str = "java.lang.String/2004016611";
const DATE_TYPE: &str = "java.util.Date/3385151746";
const INTEGER_TYPE: &str = "java.lang.Integer/3438268394";
const ARRAY_LIST_TYPE: &str = "java.util.ArrayList/4159755760";
const ICAL_FORMAT: &str = "ical";

/// `long` type signature.
const LONG_TYPE: &str = "J";

/// A request body: string table plus argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcPayload {
    strings: Vec<String>,
    tokens: Vec<String>,
}

impl RpcPayload {
    pub fn new<S: Into<String>>(strings: impl IntoIterator<Item = S>) -> Self {
        Self {
            strings: strings.into_iter().map(Into::into).collect(),
            tokens: Vec::new(),
        }
    }

    /// Append argument tokens.
    pub fn tokens<T: ToString>(mut self, tokens: impl IntoIterator<Item = T>) -> Self {
        self.tokens.extend(tokens.into_iter().map(|t| t.to_string()));
        self
    }

    /// Render the wire text.
    pub fn to_wire(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "{}|{}|{}|", STREAM_VERSION, STREAM_FLAGS, self.strings.len());
        for field in self.strings.iter().chain(self.tokens.iter()) {
            out.push_str(field);
            out.push('|');
        }
        out
    }
}

/// `MyPlanningClientServiceProxy.method1login` referencing the identity seed.
pub fn login_payload(portal: &PortalConfig, identity_seed: &str) -> RpcPayload {
    RpcPayload::new([
        portal.module_base.as_str(),
        portal.login_strong_name.as_str(),
        PLANNING_SERVICE,
        LOGIN_METHOD,
        LONG_TYPE,
        LOGIN_REQUEST,
        DIRECT_LOGIN_REQUEST,
        "",
    ])
    .tokens(["1", "2", "3", "4", "2", "5", "6", identity_seed])
    .tokens(["7", "0", "0", "0", "1", "1", "8", "8", "-1", "0", "0"])
}

/// `CorePlanningServiceProxy.method11getGeneratedUrl` for one class over
/// the `[start, end]` window (both already encoded).
pub fn generated_url_payload(
    portal: &PortalConfig,
    identity_seed: &str,
    class_id: &str,
    window_start: &str,
    window_end: &str,
) -> RpcPayload {
    let option = portal.generated_url_option.to_string();

    RpcPayload::new([
        portal.module_base.as_str(),
        portal.core_strong_name.as_str(),
        CORE_SERVICE,
        GENERATED_URL_METHOD,
        LONG_TYPE,
        LIST_TYPE,
        STRING_TYPE,
        DATE_TYPE,
        INTEGER_TYPE,
        ARRAY_LIST_TYPE,
        ICAL_FORMAT,
    ])
    .tokens(["1", "2", "3", "4", "7", "5", "6", "7", "8", "8", "9", "9"])
    .tokens([identity_seed, "10", "1", "9", class_id, "11"])
    .tokens(["8", window_start, "8", window_end])
    .tokens(["9", "-1", "9", option.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_has_header_only() {
        assert_eq!(RpcPayload::new(Vec::<String>::new()).to_wire(), "7|0|0|");
    }

    #[test]
    fn login_payload_matches_portal_capture() {
        let wire = login_payload(&PortalConfig::default(), "YvP5WgA").to_wire();
        assert_eq!(
            wire,
            "7|0|8|https://ade.univ-tours.fr/direct/gwtdirectplanning/|217140C31DF67EF6BA02D106930F5725|\
             com.adesoft.gwt.directplan.client.rpc.MyPlanningClientServiceProxy|method1login|J|\
             com.adesoft.gwt.core.client.rpc.data.LoginRequest/3705388826|\
             com.adesoft.gwt.directplan.client.rpc.data.DirectLoginRequest/635437471||\
             1|2|3|4|2|5|6|YvP5WgA|7|0|0|0|1|1|8|8|-1|0|0|"
        );
    }

    #[test]
    fn generated_url_payload_matches_portal_capture() {
        let wire =
            generated_url_payload(&PortalConfig::default(), "SEED", "10485", "START", "END")
                .to_wire();
        assert_eq!(
            wire,
            "7|0|11|https://ade.univ-tours.fr/direct/gwtdirectplanning/|748880AB5D6D59CC4770FCCE7567EA63|\
             com.adesoft.gwt.core.client.rpc.CorePlanningServiceProxy|method11getGeneratedUrl|J|\
             java.util.List|java.lang.String/2004016611|java.util.Date/3385151746|\
             java.lang.Integer/3438268394|java.util.ArrayList/4159755760|ical|\
             1|2|3|4|7|5|6|7|8|8|9|9|SEED|10|1|9|10485|11|8|START|8|END|9|-1|9|226|"
        );
    }
}
