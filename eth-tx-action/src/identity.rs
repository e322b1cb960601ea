use ethers::types::Address;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::future::Future;
use tracing::{debug, info};
use url::Url;

use crate::error::{ActionError, ActionResult};
use crate::utils::{is_address, parse_addr};

/// "user" или "user/repo" по правилам именования GitHub
static GITHUB_IDENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9]+-)*[A-Za-z0-9]+(?:/[A-Za-z0-9_-]+)?$")
        .expect("github identity regex")
});

pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://raw.githubusercontent.com";
pub const PROFILE_FILE: &str = ".web3.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GithubIdentity {
    pub owner: String,
    pub repo: Option<String>,
}

impl fmt::Display for GithubIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repo {
            Some(repo) => write!(f, "{}/{}", self.owner, repo),
            None => f.write_str(&self.owner),
        }
    }
}

/// Получатель транзакции: либо готовый адрес, либо GitHub-идентичность.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    Address(Address),
    Identity(GithubIdentity),
}

impl Destination {
    pub fn parse(raw: &str) -> ActionResult<Self> {
        let raw = raw.trim();
        if is_address(raw) {
            return parse_addr(raw)
                .map(Self::Address)
                .map_err(ActionError::Config);
        }
        if GITHUB_IDENTITY.is_match(raw) {
            let (owner, repo) = match raw.split_once('/') {
                Some((o, r)) => (o.to_string(), Some(r.to_string())),
                None => (raw.to_string(), None),
            };
            return Ok(Self::Identity(GithubIdentity { owner, repo }));
        }
        Err(ActionError::config(format!(
            "invalid destination `{raw}`: expected an address or a GitHub user/repo"
        )))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Web3Profile {
    #[serde(default)]
    pub ethereum: Option<EthereumProfile>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EthereumProfile {
    #[serde(default)]
    pub address: Option<String>,
}

/// Directory mapping GitHub identities to their published web3 profile.
/// `Ok(None)` means the identity has no profile at all.
pub trait AddressDirectory {
    fn lookup(
        &self,
        identity: &GithubIdentity,
    ) -> impl Future<Output = ActionResult<Option<Web3Profile>>> + Send;
}

/// Reads `{endpoint}/{owner}/{repo}/HEAD/.web3.json`; a bare user maps to
/// the profile repository `{owner}/{owner}`.
#[derive(Clone, Debug)]
pub struct GithubWeb3Directory {
    client: reqwest::Client,
    endpoint: Url,
}

impl GithubWeb3Directory {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn profile_url(&self, identity: &GithubIdentity) -> ActionResult<Url> {
        let repo = identity.repo.as_deref().unwrap_or(&identity.owner);
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ActionError::config(format!("identity endpoint `{}` is not a base URL", self.endpoint))
            })?
            .pop_if_empty()
            .extend([identity.owner.as_str(), repo, "HEAD", PROFILE_FILE]);
        Ok(url)
    }
}

impl AddressDirectory for GithubWeb3Directory {
    async fn lookup(&self, identity: &GithubIdentity) -> ActionResult<Option<Web3Profile>> {
        let url = self.profile_url(identity)?;
        debug!(%url, "запрос web3-профиля");

        let fail = |e: reqwest::Error| ActionError::resolution(identity.to_string(), e.to_string());
        let resp = self.client.get(url).send().await.map_err(fail)?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let profile = resp
            .error_for_status()
            .map_err(fail)?
            .json::<Web3Profile>()
            .await
            .map_err(fail)?;
        Ok(Some(profile))
    }
}

/// Прямой адрес возвращается как есть, в каталог не ходим.
pub async fn resolve_destination<D: AddressDirectory>(
    dest: &Destination,
    directory: &D,
) -> ActionResult<Address> {
    let id = match dest {
        Destination::Address(a) => return Ok(*a),
        Destination::Identity(id) => id,
    };

    let profile = directory
        .lookup(id)
        .await?
        .ok_or_else(|| ActionError::resolution(id.to_string(), "no web3 profile found"))?;
    let raw = profile
        .ethereum
        .and_then(|e| e.address)
        .ok_or_else(|| ActionError::resolution(id.to_string(), "profile has no ethereum address"))?;
    let address = parse_addr(&raw).map_err(|e| ActionError::resolution(id.to_string(), e))?;

    info!(identity = %id, address = ?address, "GitHub identity resolved");
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ADDR: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[derive(Default)]
    struct StubDirectory {
        profiles: HashMap<String, Web3Profile>,
        calls: AtomicUsize,
    }

    impl StubDirectory {
        fn with(identity: &str, address: Option<&str>) -> Self {
            let mut profiles = HashMap::new();
            profiles.insert(
                identity.to_string(),
                Web3Profile {
                    ethereum: Some(EthereumProfile {
                        address: address.map(str::to_string),
                    }),
                },
            );
            Self {
                profiles,
                ..Default::default()
            }
        }
    }

    impl AddressDirectory for StubDirectory {
        async fn lookup(&self, identity: &GithubIdentity) -> ActionResult<Option<Web3Profile>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.profiles.get(&identity.to_string()).cloned())
        }
    }

    #[test]
    fn classifies_destinations() {
        assert!(matches!(
            Destination::parse(ADDR).unwrap(),
            Destination::Address(_)
        ));
        assert_eq!(
            Destination::parse("octocat").unwrap(),
            Destination::Identity(GithubIdentity {
                owner: "octocat".into(),
                repo: None
            })
        );
        assert_eq!(
            Destination::parse("my-org/repo_name-2").unwrap(),
            Destination::Identity(GithubIdentity {
                owner: "my-org".into(),
                repo: Some("repo_name-2".into())
            })
        );
    }

    #[test]
    fn rejects_garbage_destination() {
        for bad in ["not a valid!!", "-octocat", "octo--cat", "a/b/c", ""] {
            let err = Destination::parse(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config, "{bad:?}");
        }
    }

    #[tokio::test]
    async fn direct_address_skips_directory() {
        let dir = StubDirectory::default();
        let dest = Destination::parse(ADDR).unwrap();
        let out = resolve_destination(&dest, &dir).await.unwrap();
        assert_eq!(out, parse_addr(ADDR).unwrap());
        assert_eq!(dir.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resolves_user_and_repo() {
        let dir = StubDirectory::with("octocat/repo-name", Some(ADDR));
        let dest = Destination::parse("octocat/repo-name").unwrap();
        let out = resolve_destination(&dest, &dir).await.unwrap();
        assert_eq!(out, parse_addr(ADDR).unwrap());
        assert_eq!(dir.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unresolvable_identities_fail() {
        let dest = Destination::parse("octocat").unwrap();

        let missing = StubDirectory::default();
        let err = resolve_destination(&dest, &missing).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);

        let no_address = StubDirectory::with("octocat", None);
        let err = resolve_destination(&dest, &no_address).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);

        let bad_address = StubDirectory::with("octocat", Some("0x1234"));
        let err = resolve_destination(&dest, &bad_address).await.unwrap_err();
        assert!(err.to_string().starts_with("Could not resolve \"octocat\""));
    }

    #[test]
    fn builds_profile_urls() {
        let dir = GithubWeb3Directory::new(Url::parse(DEFAULT_IDENTITY_ENDPOINT).unwrap());
        let user = GithubIdentity {
            owner: "octocat".into(),
            repo: None,
        };
        assert_eq!(
            dir.profile_url(&user).unwrap().as_str(),
            "https://raw.githubusercontent.com/octocat/octocat/HEAD/.web3.json"
        );
        let repo = GithubIdentity {
            owner: "octocat".into(),
            repo: Some("hello-world".into()),
        };
        assert_eq!(
            dir.profile_url(&repo).unwrap().as_str(),
            "https://raw.githubusercontent.com/octocat/hello-world/HEAD/.web3.json"
        );
    }

    #[test]
    fn parses_profile_json() {
        let p: Web3Profile =
            serde_json::from_str(r#"{"ethereum":{"address":"0xabc"},"other":1}"#).unwrap();
        assert_eq!(p.ethereum.unwrap().address.as_deref(), Some("0xabc"));
        let empty: Web3Profile = serde_json::from_str("{}").unwrap();
        assert!(empty.ethereum.is_none());
    }
}
