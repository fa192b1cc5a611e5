#![no_main]
use libfuzzer_sys::fuzz_target;

const DOCUMENT: &str = r#"<profile id="p1">
  <message><type>default</type>
    <point><name>data.a</name><c0>1</c0><c0>2</c0></point>
    <point><name>data.b</name><c0/></point>
  </message>
</profile>"#;

fuzz_target!(|data: &[u8]| {
    let Ok(path) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(root) = dotxml::from_str(DOCUMENT) else {
        return;
    };
    let fallback = dotxml::Value::Null;
    let _ = root.resolve(path);
    let _ = root.resolve_or(path, &fallback);
});
