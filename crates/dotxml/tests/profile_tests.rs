use std::fs;
use std::sync::Arc;

use dotxml::profile::{message_profile, points, readings};
use dotxml::{from_str, ErrorKind, ProfileStore, Value};

const SENTINEL: &str = r#"<?xml version="1.0"?>
<profile>
  <message>
    <type>default</type>
    <tag_pattern>//{server}/IOT.{device}.{point}.result</tag_pattern>
    <point><name>data.INPUT_001</name><alias>input_1</alias></point>
    <point><name>data.VOLTS</name></point>
  </message>
  <message>
    <type>alarm</type>
    <tag_pattern>//{server}/IOT.{device}.alarm</tag_pattern>
    <point><name>code</name></point>
  </message>
</profile>
"#;

fn store_with(files: &[(&str, &str)]) -> Result<(tempfile::TempDir, ProfileStore), std::io::Error> {
    let dir = tempfile::tempdir()?;
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents)?;
    }
    let store = ProfileStore::new(dir.path());
    Ok((dir, store))
}

#[test]
fn loads_and_caches_profiles() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, store) = store_with(&[("profile.site_sentinel.xml", SENTINEL)])?;

    let first = store.load("site_sentinel")?.ok_or("profile not loaded")?;
    assert_eq!(store.cached(), 1);
    assert!(first.resolve("message").is_some_and(Value::is_list));

    // served from the cache even after the file is gone
    fs::remove_file(dir.path().join("profile.site_sentinel.xml"))?;
    let second = store.load("site_sentinel")?.ok_or("profile not cached")?;
    assert!(Arc::ptr_eq(&first, &second));
    Ok(())
}

#[test]
fn unknown_device_types_are_remembered() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, store) = store_with(&[])?;

    assert!(store.load("pump")?.is_none());
    assert!(store.is_unsupported("pump"));

    // a file appearing later is not picked up
    fs::write(dir.path().join("profile.pump.xml"), SENTINEL)?;
    assert!(store.load("pump")?.is_none());
    assert_eq!(store.cached(), 0);
    Ok(())
}

#[test]
fn empty_folder_disables_loading() -> Result<(), Box<dyn std::error::Error>> {
    let store = ProfileStore::new("");
    assert!(store.load("anything")?.is_none());
    Ok(())
}

#[test]
fn file_without_profile_root_is_unsupported() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, store) = store_with(&[("profile.odd.xml", "<other><a>1</a></other>")])?;
    assert!(store.load("odd")?.is_none());
    assert!(store.is_unsupported("odd"));
    Ok(())
}

#[test]
fn broken_profile_is_an_error_and_not_cached() -> Result<(), Box<dyn std::error::Error>> {
    let (dir, store) = store_with(&[("profile.bad.xml", "<profile><message></profile>")])?;

    let err = store.load("bad").err().ok_or("expected parse error")?;
    assert!(matches!(err.kind(), ErrorKind::MismatchedTag { .. }));
    assert!(!store.is_unsupported("bad"));

    fs::write(dir.path().join("profile.bad.xml"), SENTINEL)?;
    assert!(store.load("bad")?.is_some());
    Ok(())
}

#[test]
fn message_selection_and_readings() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, store) = store_with(&[("profile.site_sentinel.xml", SENTINEL)])?;
    let profile = store.load("site_sentinel")?.ok_or("profile not loaded")?;

    let default = message_profile(&profile, "default").ok_or("no default message")?;
    let names: Vec<_> = points(default).into_keys().collect();
    assert_eq!(names, vec!["data.INPUT_001", "data.VOLTS"]);
    assert!(message_profile(&profile, "status").is_none());

    let message = from_str(
        "<msg><device>dev42</device><data><INPUT_001>3</INPUT_001><VOLTS>12.5</VOLTS></data></msg>",
    )?;
    let message = message
        .resolve("msg")
        .and_then(Value::as_node)
        .ok_or("no message")?;

    let found = readings(message, default, "AZ01");
    let tags: Vec<_> = found.iter().map(|r| r.tag.as_str()).collect();
    assert_eq!(
        tags,
        vec!["//AZ01/IOT.dev42.input_1.result", "//AZ01/IOT.dev42.data.VOLTS.result"]
    );
    assert_eq!(found.get(1).map(|r| &r.value), Some(&Value::Float(12.5)));
    Ok(())
}

#[test]
fn store_is_shared_between_threads() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, store) = store_with(&[("profile.site_sentinel.xml", SENTINEL)])?;
    let store = Arc::new(store);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.load("site_sentinel").ok().flatten().is_some())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().ok(), Some(true));
    }
    assert_eq!(store.cached(), 1);
    Ok(())
}
