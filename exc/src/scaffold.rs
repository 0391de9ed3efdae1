//! `exc --new <name>`: lay out a package skeleton ready to be zipped.

use crate::error::{ExcError, Result};
use crate::ENTRY_SCRIPT;
use exc_common::archive::set_executable;
use exc_common::manifest::{Manifest, MANIFEST_FILE};
use std::fs;
use std::path::{Path, PathBuf};

const START_SH: &str = "#!/bin/sh\ncd main\npython3 main.py $ARGS\n";
const MAIN_PY: &str = "print('Hello World')\n";

/// Create `<parent>/<name>/` with `info.json`, `start.sh` and `main/main.py`.
pub fn create(parent: &Path, name: &str) -> Result<PathBuf> {
    let root = parent.join(name);
    if root.exists() {
        return Err(ExcError::AlreadyExists { path: root });
    }

    fs::create_dir_all(root.join("main"))?;

    let start = root.join(ENTRY_SCRIPT);
    fs::write(&start, START_SH)?;
    set_executable(&start)?;

    fs::write(root.join("main").join("main.py"), MAIN_PY)?;

    let manifest = Manifest {
        name: Some(name.to_string()),
        version: Some("1.0.0".to_string()),
        description: Some("EXC application".to_string()),
        run: Some(format!("./{ENTRY_SCRIPT}")),
    };
    let manifest_path = root.join(MANIFEST_FILE);
    manifest
        .save(&manifest_path)
        .map_err(|err| ExcError::invalid_manifest(&manifest_path, err))?;

    tracing::debug!(path = %root.display(), "scaffolded package");
    Ok(root)
}
