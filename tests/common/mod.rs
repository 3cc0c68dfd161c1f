#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST: &str = r#"---
name: cf
# operators edit this part by hand; it must come back byte for byte
update:
  canaries: 1
  max_in_flight:   1   # odd spacing on purpose
instance_groups:
- name: api
  jobs:
  - name: cloud_controller_ng
    release: capi
releases:
- name: release1
  url: https://example.com/release1-1.0.tgz
  version: "1.0"
  sha1: shaA
- name: release2
  url: https://example.com/release2-1.0.tgz
  version: "1.0"
  sha1: shaB
stemcells:
- alias: default
  os: ubuntu-jammy
  version: "1.80"
"#;

pub const OPS_FILE: &str = r#"- type: replace
  path: /releases/-
  value:
    name: release1
    url: original-release1-url
    version: original-release1-version
    sha1: original-release1-sha1
- type: replace
  path: /releases/-
  value:
    name: release2
    url: original-release2-url
    version: original-release2-version
    sha1: original-release2-sha1
- type: remove
  path: /instance_groups/name=smoke-tests
"#;

pub const COMPILED_OPS_FILE: &str = r#"- type: replace
  path: /releases/name=capi/url
  value: https://storage.googleapis.com/cf-deployment-compiled-releases/capi-1.0-ubuntu-jammy-1.80-20230101-120000-1.tgz
- type: replace
  path: /releases/name=capi/version
  value: "1.0"
- type: replace
  path: /releases/name=capi/sha1
  value: sha256:old
- type: replace
  path: /releases/name=capi/stemcell?
  value:
    os: ubuntu-jammy
    version: "1.80"
"#;

/// The preamble of [`MANIFEST`], up to the `releases:` line
pub fn manifest_preamble() -> &'static str {
    let boundary = MANIFEST.find("\nreleases:\n").unwrap() + 1;
    &MANIFEST[..boundary]
}

/// `<build>/<name>-release/{file: contents}`
pub fn write_release(build: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = build.join(format!("{}-release", name));
    fs::create_dir_all(&dir).unwrap();
    for (file, contents) in files {
        fs::write(dir.join(file), contents).unwrap();
    }
    dir
}

/// `<build>/<name>-compiled-release-tarball/<tarball>`, plus the release version
pub fn write_compiled_release(build: &Path, name: &str, version: &str, tarball: &str) {
    write_release(build, name, &[("version", version)]);
    let dir = build.join(format!("{}-compiled-release-tarball", name));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(tarball), b"hello world").unwrap();
}

/// `<build>/stemcell/{version,url}`
pub fn write_stemcell(build: &Path, version: &str, os: &str) -> PathBuf {
    let dir = build.join("stemcell");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("version"), format!("{}\n", version)).unwrap();
    fs::write(
        dir.join("url"),
        format!(
            "https://storage.googleapis.com/bosh-core-stemcells/{}/bosh-stemcell-{}-warden-boshlite-{}-go_agent.tgz\n",
            version, version, os
        ),
    )
    .unwrap();
    dir
}
