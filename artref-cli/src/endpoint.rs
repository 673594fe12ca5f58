//! `artref endpoint` — print the manifest URL a reference points at.
//!
//! This is where defaults live: the parser leaves a missing registry or tag
//! empty, and this command fills them in the way Docker clients do.

use anyhow::Result;
use artref::{Identifier, Reference};

/// Environment variable overriding the built-in default registry.
pub const DEFAULT_REGISTRY_ENV: &str = "ARTREF_DEFAULT_REGISTRY";

const DOCKER_HUB: &str = "docker.io";
const DOCKER_HUB_INDEX: &str = "index.docker.io";
const DOCKER_HUB_API: &str = "registry-1.docker.io";
const DEFAULT_TAG: &str = "latest";
const OFFICIAL_REPO_PREFIX: &str = "library";

/// Arguments for `artref endpoint`.
#[derive(clap::Args)]
pub struct EndpointArgs {
    /// Artifact reference (e.g., ns/app:v1.0).
    reference: String,

    /// Registry used when the reference names none.
    #[arg(long, value_name = "HOST")]
    default_registry: Option<String>,
}

impl EndpointArgs {
    pub fn run(self) -> Result<()> {
        let reference = Reference::parse(&self.reference)?;
        let env = std::env::var(DEFAULT_REGISTRY_ENV).ok();
        let registry = default_registry(self.default_registry, env);
        tracing::info!(%reference, default_registry = %registry, "resolving endpoint");
        let url = manifest_url(&reference, &registry);
        println!("{url}");
        Ok(())
    }
}

/// Picks the fallback registry: flag, then environment, then Docker Hub.
fn default_registry(flag: Option<String>, env: Option<String>) -> String {
    flag.filter(|r| !r.is_empty())
        .or_else(|| env.filter(|r| !r.is_empty()))
        .unwrap_or_else(|| DOCKER_HUB_API.to_owned())
}

/// Builds `https://<host>/v2/<repository>/manifests/<tag-or-digest>`.
fn manifest_url(reference: &Reference, default_registry: &str) -> String {
    let host = match reference.registry().unwrap_or(default_registry) {
        DOCKER_HUB | DOCKER_HUB_INDEX => DOCKER_HUB_API,
        other => other,
    };
    let repository = if host == DOCKER_HUB_API && !reference.repository().contains('/') {
        format!("{OFFICIAL_REPO_PREFIX}/{}", reference.repository())
    } else {
        reference.repository().to_owned()
    };
    let identifier = reference.identifier().map_or(DEFAULT_TAG, Identifier::as_str);
    format!("https://{host}/v2/{repository}/manifests/{identifier}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(input: &str) -> String {
        manifest_url(&Reference::parse(input).unwrap(), DOCKER_HUB_API)
    }

    #[test]
    fn official_image_defaults() {
        assert_eq!(
            url("hello-world"),
            "https://registry-1.docker.io/v2/library/hello-world/manifests/latest"
        );
    }

    #[test]
    fn namespaced_image_keeps_repository() {
        assert_eq!(
            url("ns/app:v1.0"),
            "https://registry-1.docker.io/v2/ns/app/manifests/v1.0"
        );
    }

    #[test]
    fn explicit_registry() {
        assert_eq!(
            url("registry.example.com:5000/app:v1"),
            "https://registry.example.com:5000/v2/app/manifests/v1"
        );
        assert_eq!(
            url("docker.io/nginx"),
            "https://registry-1.docker.io/v2/library/nginx/manifests/latest"
        );
    }

    #[test]
    fn digest_identifier() {
        let digest = format!("sha256:{}", "a".repeat(64));
        assert_eq!(
            url(&format!("mcr.microsoft.com/acr/hello-world@{digest}")),
            format!("https://mcr.microsoft.com/v2/acr/hello-world/manifests/{digest}")
        );
    }

    #[test]
    fn custom_default_registry() {
        let r = Reference::parse("app").unwrap();
        assert_eq!(
            manifest_url(&r, "mirror.example.com"),
            "https://mirror.example.com/v2/app/manifests/latest"
        );
    }

    #[test]
    fn default_registry_precedence() {
        assert_eq!(
            default_registry(Some("a.example".into()), Some("b.example".into())),
            "a.example"
        );
        assert_eq!(default_registry(None, Some("b.example".into())), "b.example");
        assert_eq!(default_registry(None, None), DOCKER_HUB_API);
        assert_eq!(default_registry(None, Some(String::new())), DOCKER_HUB_API);
    }
}
