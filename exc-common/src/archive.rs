use crate::error::CommonError;
use std::fs;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Check that `path` opens as a zip archive without extracting anything.
pub fn validate_zip(path: &Path) -> Result<(), CommonError> {
    open_zip(path).map(|_| ())
}

/// Extract the bundle at `path` into `target_dir`.
///
/// Existing files are overwritten. A failure part way through leaves whatever
/// was already written in place; removing `target_dir` is up to the caller.
pub fn extract_zip_file(path: &Path, target_dir: &Path) -> Result<(), CommonError> {
    let mut archive = open_zip(path)?;
    tracing::debug!(
        archive = %path.display(),
        target = %target_dir.display(),
        entries = archive.len(),
        "extracting bundle"
    );
    extract_entries(&mut archive, target_dir)
}

pub fn set_executable(path: &Path) -> Result<(), CommonError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}

fn open_zip(path: &Path) -> Result<ZipArchive<BufReader<fs::File>>, CommonError> {
    let file = fs::File::open(path)?;
    ZipArchive::new(BufReader::new(file)).map_err(|err| CommonError::Archive(err.to_string()))
}

fn extract_entries<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    target_dir: &Path,
) -> Result<(), CommonError> {
    fs::create_dir_all(target_dir)?;

    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|err| CommonError::Archive(err.to_string()))?;
        let Some(enclosed) = file.enclosed_name() else {
            tracing::warn!(entry = file.name(), "skipping entry outside of bundle root");
            continue;
        };
        let out_path = target_dir.join(enclosed);

        if file.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut outfile = fs::File::create(&out_path)?;
        std::io::copy(&mut file, &mut outfile)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode().and_then(permission_bits) {
                fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}

/// Plain rwx bits of a stored mode. Setuid, setgid and sticky bits are
/// dropped; a mode with no rwx bits is ignored.
#[cfg(unix)]
fn permission_bits(mode: u32) -> Option<u32> {
    Some(mode & 0o777).filter(|bits| *bits != 0)
}
