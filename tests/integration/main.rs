//! Integration tests for bundle-cache
//!
//! The store is a local directory endpoint, so no network is needed.

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const LOCKFILE: &str = "GEM\n  remote: https://rubygems.org/\n  specs:\n    rack (3.0.8)\n";

    const SETTING_VARS: [&str; 10] = [
        "S3_ACCESS_KEY",
        "S3_SECRET_KEY",
        "S3_BUCKET",
        "S3_REGION",
        "S3_ENDPOINT",
        "BUNDLE_CACHE_PATH",
        "BUNDLE_CACHE_PREFIX",
        "BUNDLE_CACHE_ARCH",
        "BUNDLE_CACHE_STAGING_DIR",
        "BUNDLE_CACHE_CONFIG",
    ];

    /// Binary with a clean environment and no config file
    fn bundle_cache(home: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("bundle-cache");
        for var in SETTING_VARS {
            cmd.env_remove(var);
        }
        cmd.env("BUNDLE_CACHE_CONFIG", home.join("absent.toml"));
        cmd
    }

    /// Temp workspace holding a local store, a staging dir and projects
    struct Workspace {
        temp: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            fs::create_dir(temp.path().join("staging")).unwrap();
            Self { temp }
        }

        fn store(&self) -> PathBuf {
            self.temp.path().join("store")
        }

        fn project(&self, name: &str) -> PathBuf {
            let dir = self.temp.path().join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("Gemfile.lock"), LOCKFILE).unwrap();
            dir
        }

        /// Command configured against the local store, run inside `project`
        fn cmd(&self, project: &Path, command: &str) -> Command {
            let mut cmd = bundle_cache(self.temp.path());
            cmd.current_dir(project)
                .env("S3_ACCESS_KEY", "AKIDEXAMPLE")
                .env("S3_SECRET_KEY", "secret")
                .env("S3_BUCKET", "bundles")
                .env("S3_ENDPOINT", self.store())
                .args([command, "--prefix", "app", "--arch", "amd64"])
                .arg("--staging-dir")
                .arg(self.temp.path().join("staging"));
            cmd
        }
    }

    fn install_bundle(project: &Path) {
        let gems = project.join(".bundle/ruby/3.2.0/gems/rack-3.0.8/lib");
        fs::create_dir_all(&gems).unwrap();
        fs::write(gems.join("rack.rb"), "module Rack; end\n").unwrap();
        fs::write(project.join(".bundle/config"), "BUNDLE_PATH: \".bundle\"\n").unwrap();
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        bundle_cache(temp.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("upload"))
            .stdout(predicate::str::contains("download"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        bundle_cache(temp.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("bundle-cache"));
    }

    #[test]
    fn missing_command_is_wrong_usage() {
        let temp = TempDir::new().unwrap();
        bundle_cache(temp.path())
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Usage"));
    }

    #[test]
    fn unknown_command_is_wrong_usage() {
        let temp = TempDir::new().unwrap();
        bundle_cache(temp.path()).arg("sync").assert().code(2);
    }

    #[test]
    fn missing_credentials() {
        let temp = TempDir::new().unwrap();
        bundle_cache(temp.path())
            .current_dir(temp.path())
            .arg("upload")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Please provide S3 access key"));
    }

    #[test]
    fn missing_bucket() {
        let temp = TempDir::new().unwrap();
        bundle_cache(temp.path())
            .current_dir(temp.path())
            .env("S3_ACCESS_KEY", "AKIDEXAMPLE")
            .env("S3_SECRET_KEY", "secret")
            .arg("download")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("bucket name"));
    }

    #[test]
    fn credentials_from_config_file() {
        let ws = Workspace::new();
        let project = ws.project("app");
        let config = ws.temp.path().join("config.toml");
        fs::write(
            &config,
            format!(
                concat!(
                    "[s3]\n",
                    "access_key = \"AKIDEXAMPLE\"\n",
                    "secret_key = \"secret\"\n",
                    "bucket = \"bundles\"\n",
                    "endpoint = \"{}\"\n",
                ),
                ws.store().display()
            ),
        )
        .unwrap();

        bundle_cache(ws.temp.path())
            .current_dir(&project)
            .env("BUNDLE_CACHE_CONFIG", &config)
            .arg("upload")
            .assert()
            .code(4);
    }

    #[test]
    fn invalid_config_file() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");
        fs::write(&config, "[s3\n").unwrap();

        bundle_cache(temp.path())
            .current_dir(temp.path())
            .arg("--config")
            .arg(&config)
            .arg("upload")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn endpoint_with_path_is_rejected() {
        let temp = TempDir::new().unwrap();
        bundle_cache(temp.path())
            .current_dir(temp.path())
            .env("S3_ACCESS_KEY", "AKIDEXAMPLE")
            .env("S3_SECRET_KEY", "secret")
            .env("S3_BUCKET", "bundles")
            .args(["upload", "--endpoint", "https://minio.example.com/s3"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("must not contain a path"));
    }

    #[test]
    fn missing_lockfile() {
        let ws = Workspace::new();
        let project = ws.project("app");
        fs::remove_file(project.join("Gemfile.lock")).unwrap();

        ws.cmd(&project, "upload")
            .assert()
            .code(6)
            .stderr(predicate::str::contains("Gemfile.lock"));
    }

    #[test]
    fn upload_without_bundle() {
        let ws = Workspace::new();
        let project = ws.project("app");

        ws.cmd(&project, "upload").assert().code(4);
        assert!(!ws.store().exists());
    }

    #[test]
    fn download_refuses_existing_bundle() {
        let ws = Workspace::new();
        let project = ws.project("app");
        install_bundle(&project);

        ws.cmd(&project, "download").assert().code(5);
        assert!(!project.join(".bundle/.cache").exists());
    }

    #[test]
    fn download_missing_object() {
        let ws = Workspace::new();
        let project = ws.project("app");

        ws.cmd(&project, "down")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Error:"));
        assert!(!project.join(".bundle").exists());
    }

    #[test]
    fn upload_then_download_round_trip() {
        let ws = Workspace::new();
        let origin = ws.project("origin");
        install_bundle(&origin);

        ws.cmd(&origin, "up").assert().success();
        let stored: Vec<_> = fs::read_dir(ws.store().join("bundles"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].starts_with("app_"));
        assert!(stored[0].ends_with("_amd64.tar.gz"));

        let target = ws.project("target");
        ws.cmd(&target, "download").assert().success();

        assert_eq!(
            fs::read_to_string(target.join(".bundle/ruby/3.2.0/gems/rack-3.0.8/lib/rack.rb"))
                .unwrap(),
            "module Rack; end\n"
        );
        assert!(target.join(".bundle/config").is_file());
        assert!(target.join(".bundle/.cache").is_file());
        assert!(!target.join(".bundle/bundle_cache.tar.gz").exists());

        // Second download is a no-op, even with the store gone
        fs::remove_dir_all(ws.store()).unwrap();
        ws.cmd(&target, "download")
            .assert()
            .success()
            .stdout(predicate::str::contains("skipping"));
    }

    #[test]
    fn changed_lockfile_misses_cache() {
        let ws = Workspace::new();
        let origin = ws.project("origin");
        install_bundle(&origin);
        ws.cmd(&origin, "upload").assert().success();

        let target = ws.project("target");
        fs::write(target.join("Gemfile.lock"), format!("{}    rake (13.1.0)\n", LOCKFILE)).unwrap();

        ws.cmd(&target, "download").assert().code(1);
    }

    #[test]
    fn info_json() {
        let ws = Workspace::new();
        let project = ws.project("app");

        let output = ws
            .cmd(&project, "info")
            .args(["--format", "json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let info: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(info["state"], "missing");
        let object = info["object_name"].as_str().unwrap();
        assert!(object.starts_with("app_"));
        assert!(object.ends_with("_amd64.tar.gz"));
        assert_eq!(info["key"].as_str().unwrap().len(), "app__amd64".len() + 40);
    }

    #[test]
    fn info_plain() {
        let ws = Workspace::new();
        let project = ws.project("app");

        ws.cmd(&project, "info")
            .assert()
            .success()
            .stdout(predicate::str::contains("Key"))
            .stdout(predicate::str::contains("missing"));
    }
}
