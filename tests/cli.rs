use std::{env, fs, path::PathBuf, process::Command};

fn workdir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("zrmc-test-{}-{name}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir should be writable");
    dir
}

fn zrmc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_zrmc"))
}

#[test]
fn writes_the_output_next_to_the_input() {
    let dir = workdir("ok");
    let input = dir.join("hello.zrm");
    fs::write(&input, "fn Main() { Print(\"hi\"); }").expect("source should be writable");

    let status = zrmc().arg(&input).status().expect("the compiler should run");
    assert!(status.success());

    let compiled = fs::read_to_string(dir.join("hello.cpp")).expect("output should exist");
    assert!(compiled.contains("int main()"));
}

#[test]
fn a_failed_compile_leaves_no_output_behind() {
    let dir = workdir("err");
    let input = dir.join("broken.zrm");
    fs::write(&input, "fn Main() { Print(y); }").expect("source should be writable");
    let output = dir.join("broken.cpp");

    let status = zrmc()
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .status()
        .expect("the compiler should run");
    assert!(!status.success());
    assert!(!output.exists());
}
