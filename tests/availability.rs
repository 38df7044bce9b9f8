use cmdcapture::CommandCapture;
use cmdcapture::exec::availability::find_executable;

#[test]
fn nonexistent_command_is_not_available() {
    assert!(!CommandCapture::is_available("definitely_nonexistent_command_12345"));
}

#[test]
fn empty_and_blank_names_are_not_available() {
    assert!(!CommandCapture::is_available(""));
    assert!(!CommandCapture::is_available("   "));
}

#[cfg(unix)]
mod unix {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    #[test]
    fn common_tools_are_available() {
        assert!(CommandCapture::is_available("sh"));
        assert!(CommandCapture::is_available("ls"));
    }

    #[test]
    fn absolute_paths_are_checked_directly() {
        assert!(CommandCapture::is_available("/bin/sh"));
        assert!(!CommandCapture::is_available("/bin/definitely_nonexistent_12345"));
    }

    #[test]
    fn find_executable_returns_the_resolved_path() {
        let path = find_executable("sh").expect("sh must be on PATH");
        assert!(path.is_absolute() || path.components().count() > 1);
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("sh"));
    }

    #[test]
    fn files_without_execute_bit_are_not_available() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let script = dir.path().join("not_executable.sh");
        fs::write(&script, "#!/bin/sh\necho hi\n")?;
        fs::set_permissions(&script, fs::Permissions::from_mode(0o644))?;

        assert!(!CommandCapture::is_available(script.to_str().unwrap()));

        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
        assert!(CommandCapture::is_available(script.to_str().unwrap()));
        Ok(())
    }

    #[test]
    fn directories_are_not_executables() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        assert!(!CommandCapture::is_available(dir.path().to_str().unwrap()));
        Ok(())
    }
}
