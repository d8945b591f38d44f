use anyhow::Result;
use tds_reconcile::*;
use tds_testkit::{canonical, expected_time, LogCapture, ManagedDir};

const TDS: &str = "20170704170000";

#[test]
fn scenario_identical_content_collapses_into_one() -> Result<()> {
    let d = ManagedDir::new()?;
    let body = b"same bytes twice";
    let target = canonical(TDS, body);
    d.write(&target, body)?;
    let legacy = d.write(TDS, body)?;

    let out = Reconciler::default().process(&legacy)?;

    assert!(out.duplicate_removed);
    assert_eq!(out.name, target);
    assert!(out.renamed());
    assert_eq!(d.names()?, vec![target.clone()]);
    assert_eq!(d.read(&target)?, body);
    assert_eq!(d.mtime(&target)?, expected_time(TDS)?);
    Ok(())
}

#[test]
fn scenario_different_content_is_a_collision() -> Result<()> {
    let d = ManagedDir::new()?;
    let body = b"the real content";
    let target = canonical(TDS, body);

    // Something else squats on the canonical name.
    d.write(&target, b"mistagged squatter")?;
    d.backdate(&target, "19900101000000")?;
    let squatter_mtime = d.mtime(&target)?;

    let stale = format!("{TDS}.00000000000000000000000000000000");
    let path = d.write(&stale, body)?;
    let before = d.names()?;

    let err = Reconciler::default().process(&path).unwrap_err();

    match &err {
        RetagError::NameCollision { base, proposed, .. } => {
            assert_eq!(base, &stale);
            assert_eq!(proposed, &target);
        }
        other => panic!("expected NameCollision, got {other}"),
    }
    assert_eq!(err.kind(), "NAME_COLLISION");
    assert_eq!(d.names()?, before, "no rename or delete on collision");
    assert_eq!(d.read(&stale)?, body);
    assert_eq!(d.read(&target)?, b"mistagged squatter");
    assert_eq!(d.mtime(&target)?, squatter_mtime);
    Ok(())
}

const SHARED_WARNING: &str = "multiple files with the same timestamp code";

fn process_logged(
    opts: ReconcileOptions,
    path: &std::path::Path,
) -> (Result<Reconciled, RetagError>, String) {
    let logs = LogCapture::default();
    let out = tracing::subscriber::with_default(logs.subscriber(), || {
        Reconciler::new(opts).process(path)
    });
    (out, logs.text())
}

#[test]
fn scenario_shared_timestamp_is_only_a_warning() -> Result<()> {
    let d = ManagedDir::new()?;
    d.write(&format!("{TDS}.11111111111111111111111111111111"), b"other")?;
    let path = d.write(TDS, b"mine")?;

    let (out, logs) = process_logged(
        ReconcileOptions {
            warn_shared_timestamp: true,
        },
        &path,
    );

    assert_eq!(out?.name, canonical(TDS, b"mine"));
    assert_eq!(d.names()?.len(), 2);
    assert!(logs.contains(SHARED_WARNING), "logs: {logs}");
    assert!(logs.contains("WARN"), "logs: {logs}");
    Ok(())
}

#[test]
fn scenario_shared_timestamp_warning_can_be_disabled() -> Result<()> {
    let d = ManagedDir::new()?;
    d.write(&format!("{TDS}.11111111111111111111111111111111"), b"other")?;
    let path = d.write(TDS, b"mine")?;

    let (out, logs) = process_logged(
        ReconcileOptions {
            warn_shared_timestamp: false,
        },
        &path,
    );

    assert_eq!(out?.name, canonical(TDS, b"mine"));
    assert!(!logs.contains(SHARED_WARNING), "logs: {logs}");
    Ok(())
}

#[test]
fn scenario_directories_do_not_count_as_siblings() -> Result<()> {
    let d = ManagedDir::new()?;
    d.subdir(&format!("{TDS}.d"))?;
    let path = d.write(TDS, b"alone")?;

    let (out, logs) = process_logged(ReconcileOptions::default(), &path);

    assert_eq!(out?.name, canonical(TDS, b"alone"));
    assert!(!logs.contains(SHARED_WARNING), "logs: {logs}");
    Ok(())
}

#[cfg(unix)]
#[test]
fn scenario_hard_linked_stale_name_is_collapsed() -> Result<()> {
    let d = ManagedDir::new()?;
    let body = b"one inode, two names";
    let target = canonical(TDS, body);
    let canonical_path = d.write(&target, body)?;
    let stale = format!("{TDS}.ffffffffffffffffffffffffffffffff");
    std::fs::hard_link(&canonical_path, d.join(&stale))?;

    let out = Reconciler::default().process(d.join(&stale))?;

    assert!(out.renamed());
    assert!(out.duplicate_removed);
    assert_eq!(out.name, target);
    assert_eq!(d.names()?, vec![target.clone()]);
    assert_eq!(d.read(&target)?, body);
    assert_eq!(d.mtime(&target)?, expected_time(TDS)?);

    // Nothing left to repair.
    let again = Reconciler::default().process(d.join(&target))?;
    assert!(!again.renamed());
    assert!(!again.duplicate_removed);
    Ok(())
}

#[cfg(unix)]
#[test]
fn scenario_unreadable_existing_target_is_digest_error() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let d = ManagedDir::new()?;
    let body = b"readable source";
    let target = canonical(TDS, body);
    let target_path = d.write(&target, b"locked squatter")?;
    std::fs::set_permissions(&target_path, std::fs::Permissions::from_mode(0o000))?;

    // root ignores mode bits; nothing to assert in that case.
    if std::fs::File::open(&target_path).is_ok() {
        return Ok(());
    }

    let path = d.write(TDS, body)?;
    let before = d.names()?;
    let err = Reconciler::default().process(&path).unwrap_err();

    std::fs::set_permissions(&target_path, std::fs::Permissions::from_mode(0o644))?;
    match &err {
        RetagError::DigestComputationError { file, .. } => assert_eq!(file, &target),
        other => panic!("expected DigestComputationError, got {other}"),
    }
    assert_eq!(d.names()?, before);
    assert_eq!(d.read(TDS)?, body);
    Ok(())
}
