fn main(){
    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    
    let mut config = cbindgen::Config::default();
    config.language = cbindgen::Language::C;
    config.include_guard = Some("DABBLE_LINK_H".to_string());

    cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_config(config)
        .generate()
        .expect("Unable to generate bindings")
        .write_to_file("include/dabble_link.h");
}
