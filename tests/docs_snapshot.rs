use text_overlay_rust::server::models::docs_descriptor;

#[test]
fn endpoint_index() {
    let docs = docs_descriptor();
    let routes: Vec<String> = docs
        .endpoints
        .iter()
        .map(|endpoint| format!("{} {}", endpoint.method, endpoint.path))
        .collect();
    insta::assert_json_snapshot!(routes);
}

#[test]
fn overlay_endpoint_documents_required_parameters() {
    let docs = docs_descriptor();
    let overlay = docs
        .endpoints
        .iter()
        .find(|endpoint| endpoint.path == "/api/overlay")
        .expect("overlay endpoint documented");
    let required: Vec<&str> = overlay
        .parameters
        .iter()
        .filter(|param| param.required)
        .map(|param| param.name)
        .collect();
    assert_eq!(required, vec!["image", "text"]);
}
