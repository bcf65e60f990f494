//! End-to-end composition scenarios

use laminate_config::ProjectManifest;
use laminate_engine::system::DirEntry;
use laminate_engine::{
    AbsPath, AddonNaming, BuildOptions, Builder, Error, ExclusionSet, LayerComposer, RealSystem,
    Result, System, VariantStatus,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

fn abs(path: &Path) -> AbsPath {
    AbsPath::new(path.to_path_buf()).unwrap()
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Relative path to content for every file under `root`
fn snapshot(root: &Path) -> BTreeMap<String, String> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            (rel, fs::read_to_string(e.path()).unwrap())
        })
        .collect()
}

fn compose(temp: &TempDir, patterns: &[&str]) -> laminate_engine::MergeReport {
    let exclusions = ExclusionSet::new(patterns);
    let naming = AddonNaming::default();
    LayerComposer::new(&RealSystem, &exclusions, &naming)
        .compose(
            &abs(&temp.path().join("base")),
            &abs(&temp.path().join("variant")),
            &abs(&temp.path().join("out")),
        )
        .unwrap()
}

#[test]
fn test_end_to_end_overlay() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "base/A.ini", "[Sec1]\nk=1\n");
    write(temp.path(), "base/B.txt", "b");
    write(temp.path(), "variant/A.addon.ini", "[Sec1]\nk=2\nk2=9\n");
    write(temp.path(), "variant/C.txt", "c");
    write(temp.path(), "variant/junk.tmp", "x");

    let report = compose(&temp, &["*.tmp"]);

    let out = snapshot(&temp.path().join("out"));
    let expected: BTreeMap<String, String> = [
        ("A.ini", "[Sec1]\nk=2\nk2=9\n\n"),
        ("B.txt", "b"),
        ("C.txt", "c"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    assert_eq!(out, expected);
    assert_eq!(report.excluded(), 1);
    assert_eq!(report.failed(), 0);
}

#[test]
fn test_orphan_addon_patches_base_layer_file() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "base/data/X.ini",
        "[HEADER]\nVERSION=1\n[TURBO]\nBOOST=0.5\n",
    );
    write(temp.path(), "variant/data/X.addon.ini", "[TURBO]\nDELETE=1\n[NEW]\nA=1\n");

    let report = compose(&temp, &[]);

    let out = snapshot(&temp.path().join("out"));
    assert_eq!(out.len(), 1);
    assert_eq!(out["data/X.ini"], "[HEADER]\nVERSION=1\n\n[NEW]\nA=1\n\n");
    assert_eq!(report.addons_applied(), 1);
}

#[test]
fn test_exclusion_beats_merge() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "base/data/car.ini", "[A]\nk=1\n");
    write(temp.path(), "variant/data/car.addon.ini", "[A]\nk=2\n");
    write(temp.path(), "variant/data/~car.addon.ini", "[A]\nk=3\n");

    compose(&temp, &["data/**/car.addon.ini", "~*"]);

    let out = snapshot(&temp.path().join("out"));
    assert_eq!(out["data/car.ini"], "[A]\nk=1\n");
    assert_eq!(out.len(), 1);
}

#[test]
fn test_one_sided_subdirectory_copied_with_exclusions() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("base")).unwrap();
    write(temp.path(), "variant/skins/red/livery.dds", "dds");
    write(temp.path(), "variant/skins/red/livery.psd", "psd");
    write(temp.path(), "variant/skins/red/ui_skin.addon.ini", "[S]\nk=1\n");

    let report = compose(&temp, &["*.psd"]);

    let out = snapshot(&temp.path().join("out"));
    assert_eq!(out.len(), 2);
    assert_eq!(out["skins/red/livery.dds"], "dds");
    assert_eq!(out["skins/red/ui_skin.ini"], "[S]\nk=1\n\n");
    assert_eq!(report.addons_promoted(), 1);
    assert_eq!(report.directories_created(), 2);
}

/// A filesystem that refuses to read one named file or directory
struct FlakySystem {
    inner: RealSystem,
    broken: &'static str,
}

impl FlakySystem {
    fn check(&self, path: &AbsPath) -> Result<()> {
        if path.as_path().file_name().and_then(|n| n.to_str()) == Some(self.broken) {
            return Err(Error::FileRead {
                path: path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            });
        }
        Ok(())
    }
}

impl System for FlakySystem {
    fn read_file(&self, path: &AbsPath) -> Result<Vec<u8>> {
        self.check(path)?;
        self.inner.read_file(path)
    }

    fn write_file(&self, path: &AbsPath, content: &[u8]) -> Result<()> {
        self.inner.write_file(path, content)
    }

    fn copy_file(&self, from: &AbsPath, to: &AbsPath) -> Result<()> {
        self.check(from)?;
        self.inner.copy_file(from, to)
    }

    fn rename(&self, from: &AbsPath, to: &AbsPath) -> Result<()> {
        self.inner.rename(from, to)
    }

    fn create_dir_all(&self, path: &AbsPath) -> Result<()> {
        self.inner.create_dir_all(path)
    }

    fn read_dir(&self, path: &AbsPath) -> Result<Vec<DirEntry>> {
        self.check(path)?;
        self.inner.read_dir(path)
    }

    fn remove_all(&self, path: &AbsPath) -> Result<()> {
        self.inner.remove_all(path)
    }

    fn exists(&self, path: &AbsPath) -> bool {
        self.inner.exists(path)
    }

    fn is_dir(&self, path: &AbsPath) -> bool {
        self.inner.is_dir(path)
    }

    fn is_file(&self, path: &AbsPath) -> bool {
        self.inner.is_file(path)
    }
}

#[test]
fn test_single_entry_failure_does_not_stop_traversal() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "base/a.txt", "a");
    write(temp.path(), "base/broken.dds", "x");
    write(temp.path(), "base/data/z.ini", "[Z]\nz=1\n");
    write(temp.path(), "variant/data/z.addon.ini", "[Z]\nz=2\n");

    let system = FlakySystem {
        inner: RealSystem,
        broken: "broken.dds",
    };
    let exclusions = ExclusionSet::default();
    let naming = AddonNaming::default();
    let report = LayerComposer::new(&system, &exclusions, &naming)
        .compose(
            &abs(&temp.path().join("base")),
            &abs(&temp.path().join("variant")),
            &abs(&temp.path().join("out")),
        )
        .unwrap();

    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures()[0].path.to_slash_string(), "broken.dds");
    assert!(report.failures()[0].reason.contains("denied"));

    let out = snapshot(&temp.path().join("out"));
    assert_eq!(out["a.txt"], "a");
    assert_eq!(out["data/z.ini"], "[Z]\nz=2\n\n");
    assert!(!out.contains_key("broken.dds"));
}

fn car_project(temp: &TempDir) {
    write(
        temp.path(),
        "info.toml",
        "[info]\nproject = \"Pack\"\nversion = \"1.2\"\nyear = 2024\n\n[build]\nignore = [\"~*\", \"*.tmp\"]\n",
    );
    write(temp.path(), "base/model.kn5", "kn5");
    write(temp.path(), "base/data/lods.ini", "[LOD_0]\nFILE=model.kn5\nOUT=15\n");
    write(temp.path(), "base/data/car.ini", "[BASIC]\nTOTALMASS=1200\n");
    write(
        temp.path(),
        "base/ui/ui_car.json",
        "{\"name\": \"Base\", \"description\": \"A car.\"}",
    );
    write(temp.path(), "base/~notes.txt", "private");

    write(temp.path(), "gt3/data/car.addon.ini", "[BASIC]\nTOTALMASS=1150\n");
    write(temp.path(), "gt3/ui/ui_car.json", "{\"name\": \"GT3\"}");
    write(temp.path(), "road/data/extra.addon.ini", "[EXTRA]\nON=1\n");
}

#[test]
fn test_project_build() {
    let temp = TempDir::new().unwrap();
    car_project(&temp);
    let manifest = ProjectManifest::load(temp.path()).unwrap();

    let builder = Builder::new(&RealSystem, abs(temp.path()), &manifest).unwrap();
    let summary = builder.build(&BuildOptions::default()).unwrap();

    assert!(summary.is_success());
    assert_eq!(
        summary
            .variants
            .iter()
            .map(|v| v.name.as_str())
            .collect::<Vec<_>>(),
        vec!["gt3", "road"]
    );

    let gt3 = snapshot(&temp.path().join("Build/gt3"));
    assert_eq!(
        gt3.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["data/car.ini", "data/lods.ini", "gt3.kn5", "ui/ui_car.json"]
    );
    assert_eq!(gt3["data/car.ini"], "[BASIC]\nTOTALMASS=1150\n\n");
    assert_eq!(gt3["data/lods.ini"], "[LOD_0]\nFILE=gt3.kn5\nOUT=15\n");

    let ui: serde_json::Value = serde_json::from_str(&gt3["ui/ui_car.json"]).unwrap();
    assert_eq!(ui["name"], "GT3");
    assert_eq!(ui["version"], "1.2");
    assert_eq!(ui["year"], 2024);
    assert!(
        ui["description"]
            .as_str()
            .unwrap()
            .starts_with("<br><br>Car compiled on ")
    );

    let road = snapshot(&temp.path().join("Build/road"));
    assert_eq!(road["data/extra.ini"], "[EXTRA]\nON=1\n\n");
    assert_eq!(road["data/car.ini"], "[BASIC]\nTOTALMASS=1200\n");
    assert!(road.contains_key("road.kn5"));
    assert!(
        road["ui/ui_car.json"].contains("A car.<br><br>Car compiled on "),
        "{}",
        road["ui/ui_car.json"]
    );
}

#[test]
fn test_unreadable_variant_does_not_stop_others() {
    let temp = TempDir::new().unwrap();
    car_project(&temp);
    let manifest = ProjectManifest::load(temp.path()).unwrap();

    let system = FlakySystem {
        inner: RealSystem,
        broken: "road",
    };
    let builder = Builder::new(&system, abs(temp.path()), &manifest).unwrap();
    let summary = builder.build(&BuildOptions::default()).unwrap();

    assert_eq!(summary.total(), 2);
    assert_eq!(summary.aborted(), 1);
    assert!(!summary.is_success());
    assert!(!summary.variants[0].is_aborted());
    assert!(summary.variants[1].is_aborted());
    assert!(temp.path().join("Build/gt3/gt3.kn5").exists());
}

#[test]
fn test_strict_mode_aborts_only_that_variant() {
    let temp = TempDir::new().unwrap();
    car_project(&temp);
    write(temp.path(), "road/data/extra.addon.ini", "ON=1\n");
    let manifest = ProjectManifest::load(temp.path()).unwrap();
    let builder = Builder::new(&RealSystem, abs(temp.path()), &manifest).unwrap();

    let summary = builder
        .build(&BuildOptions {
            strict: true,
            ..Default::default()
        })
        .unwrap();

    assert_eq!(summary.aborted(), 1);
    let road = &summary.variants[1];
    assert_eq!(road.name, "road");
    assert!(matches!(
        road.status,
        VariantStatus::Aborted {
            error: Error::ConfigParse { line: 1, .. }
        }
    ));
    assert!(!summary.variants[0].is_aborted());

    let lenient = builder
        .build(&BuildOptions {
            replace_output: true,
            ..Default::default()
        })
        .unwrap();
    assert!(lenient.is_success());
    assert!(lenient.warnings() >= 1);
}
