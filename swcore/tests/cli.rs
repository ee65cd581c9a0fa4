use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use assert_cmd::prelude::*;

const MAPLE: &str = r#"
compatible = "realtek,maple-switchcore"

[transport]
kind = "memory"

[registers]
"0x00d4" = "0x83806800"
"0x1024" = "0x00800000"
"0x00d8" = "0x00016275"
"0x1000" = "0x00000010"

[read-only]
"0x00d8" = "0x0fffffff"
"#;

fn write_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("swcore-{}-{name}.toml", std::process::id()));
    fs::write(&path, contents).unwrap();

    path
}

fn swcore(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("swcore").unwrap();
    cmd.env_remove("RUST_LOG").arg("--config").arg(config);

    cmd
}

fn stdout(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();

    String::from_utf8(output).unwrap()
}

#[test]
fn identify() {
    let config = write_config("identify", MAPLE);

    let output = stdout(swcore(&config).arg("identify"));
    assert!(output.contains("RTL8380M rev. A, RL:6275"), "{output}");
    assert!(output.contains("realtek-switchcore-pinctrl (realtek,maple-pinctrl)"));
}

#[test]
fn set_mux() {
    let config = write_config("set-mux", MAPLE);

    let output = stdout(swcore(&config).args(["set-mux", "gpio", "jtag"]));
    assert!(output.contains("0x1000: 0x00000010 -> 0x00000018"), "{output}");
}

#[test]
fn set_mux_rejects_unlisted_pairs() {
    let config = write_config("set-mux-unlisted", MAPLE);

    swcore(&config)
        .args(["set-mux", "uart1", "jtag"])
        .assert()
        .failure();
    swcore(&config)
        .args(["set-mux", "i2c", "jtag"])
        .assert()
        .failure();
}

#[test]
fn chip_flag_overrides_config() {
    let config = write_config("chip-flag", MAPLE);

    let output = stdout(swcore(&config).args(["--chip", "cypress", "groups"]));
    assert!(output.contains("aux-mdio"));
    assert!(output.contains("0x00e4[20:18]"), "{output}");
}

#[test]
fn status() {
    let config = write_config("status", MAPLE);

    let output = stdout(swcore(&config).arg("status"));
    // Only the UART bit is set
    assert!(output.contains("uart1"));
    assert!(output.contains("gpio"));
    assert!(!output.contains("spi-slave"), "{output}");
}

#[test]
fn missing_chip() {
    let config = write_config("missing-chip", "[transport]\nkind = \"memory\"\n");

    swcore(&config).arg("pins").assert().failure();
    swcore(&config)
        .args(["--compatible", "realtek,cypress-pinctrl", "pins"])
        .assert()
        .success();
}

#[test]
fn unknown_config_key() {
    let config = write_config("unknown-key", "chip = \"maple\"\n");

    swcore(&config).arg("functions").assert().failure();
}

#[cfg(unix)]
#[test]
fn listings_never_open_the_transport() {
    let config = write_config(
        "listings",
        r#"
compatible = "realtek,maple-switchcore"

[transport]
kind = "devmem"
path = "/nonexistent/swcore/mem"
"#,
    );

    let output = stdout(swcore(&config).arg("pins"));
    assert!(output.contains("jtag"), "{output}");
    let output = stdout(swcore(&config).arg("groups"));
    assert!(output.contains("0x1000[3:2]"), "{output}");
    let output = stdout(swcore(&config).arg("functions"));
    assert!(output.contains("gpio"), "{output}");

    swcore(&config).arg("identify").assert().failure();
    swcore(&config).arg("status").assert().failure();
}
