//! Structured fuzz target for connection strings.
//!
//! Builds URLs that pass the scheme check so the fuzzer spends its time in
//! host, port, namespace and query handling.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_structured_url
//! ```

#![no_main]

use aerospike_url::{keys, parse};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzUrl {
    userinfo: Option<(String, Option<String>)>,
    host: String,
    port: Option<String>,
    path: Vec<String>,
    params: Vec<(u8, String)>,
}

impl FuzzUrl {
    fn to_url(&self) -> String {
        let mut url = String::from("aerospike://");

        if let Some((user, password)) = &self.userinfo {
            url.push_str(user);
            if let Some(password) = password {
                url.push(':');
                url.push_str(password);
            }
            url.push('@');
        }

        url.push_str(&self.host);
        if let Some(port) = &self.port {
            url.push(':');
            url.push_str(port);
        }

        for segment in &self.path {
            url.push('/');
            url.push_str(segment);
        }

        if !self.params.is_empty() {
            url.push('?');
            let pairs: Vec<String> = self
                .params
                .iter()
                .map(|(key, value)| {
                    let key = keys::ALL[usize::from(*key) % keys::ALL.len()];
                    format!("{key}={value}")
                })
                .collect();
            url.push_str(&pairs.join("&"));
        }

        url
    }
}

fuzz_target!(|input: FuzzUrl| {
    if let Ok(factory) = parse(&input.to_url()) {
        // A successful parse always resolves the required parts.
        assert!(!factory.hostname().is_empty());
        assert!(!factory.namespace().trim().is_empty());
        assert!(!factory.namespace().chars().any(char::is_whitespace));
    }
});
