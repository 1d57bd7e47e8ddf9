// ─── Platform Descriptor ───
// The fixed view of "where are we running" that rule evaluation, native
// classifier selection and the runtime manifest lookup are evaluated against.

/// A fixed description of the host platform, in Mojang's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// OS name as used in `rules[].os.name` and `natives` keys.
    pub os_name: &'static str,
    /// Values of `rules[].os.arch` that count as a match for libraries and
    /// game arguments.
    pub arches: &'static [&'static str],
    /// Narrower set used for JVM argument rules, so `x86`-only stack flags
    /// stay off 64-bit hosts.
    pub jvm_arches: &'static [&'static str],
    /// Replacement for `${arch}` inside native classifier names.
    pub native_arch_bits: &'static str,
    /// Key of the runtime distribution manifest.
    pub runtime_key: &'static str,
    /// Executable inside `runtime/<component>/bin`.
    pub java_executable: &'static str,
    pub classpath_separator: &'static str,
    /// Extra JVM flags prepended to the default argument set used by
    /// releases that carry no structured JVM arguments.
    pub legacy_jvm_args: &'static [&'static str],
}

impl Platform {
    pub const WINDOWS_X64: Platform = Platform {
        os_name: "windows",
        arches: &["x64", "x86"],
        jvm_arches: &["x64"],
        native_arch_bits: "64",
        runtime_key: "windows-x64",
        java_executable: "javaw.exe",
        classpath_separator: ";",
        legacy_jvm_args: &[
            "-Dos.name=Windows 10",
            "-Dos.version=10.0",
            "-XX:HeapDumpPath=MojangTricksIntelDriversForPerformance_javaw.exe_minecraft.exe.heapdump",
        ],
    };

    pub const LINUX_X64: Platform = Platform {
        os_name: "linux",
        arches: &["x64", "x86"],
        jvm_arches: &["x64"],
        native_arch_bits: "64",
        runtime_key: "linux",
        java_executable: "java",
        classpath_separator: ":",
        legacy_jvm_args: &[],
    };

    /// Mojang publishes no managed runtime for this key, so installs fail at
    /// the runtime lookup.
    pub const LINUX_ARM64: Platform = Platform {
        os_name: "linux",
        arches: &["arm64"],
        jvm_arches: &["arm64"],
        native_arch_bits: "64",
        runtime_key: "linux-arm64",
        java_executable: "java",
        classpath_separator: ":",
        legacy_jvm_args: &[],
    };

    pub const MACOS_X64: Platform = Platform {
        os_name: "osx",
        arches: &["x64", "x86"],
        jvm_arches: &["x64"],
        native_arch_bits: "64",
        runtime_key: "mac-os",
        java_executable: "java",
        classpath_separator: ":",
        legacy_jvm_args: &["-XstartOnFirstThread"],
    };

    pub const MACOS_ARM64: Platform = Platform {
        os_name: "osx",
        arches: &["arm64"],
        jvm_arches: &["arm64"],
        native_arch_bits: "64",
        runtime_key: "mac-os-arm64",
        java_executable: "java",
        classpath_separator: ":",
        legacy_jvm_args: &["-XstartOnFirstThread"],
    };

    /// The descriptor for the platform this binary was compiled for.
    pub const fn current() -> Platform {
        if cfg!(target_os = "windows") {
            Self::WINDOWS_X64
        } else if cfg!(all(target_os = "macos", target_arch = "aarch64")) {
            Self::MACOS_ARM64
        } else if cfg!(target_os = "macos") {
            Self::MACOS_X64
        } else if cfg!(target_arch = "aarch64") {
            Self::LINUX_ARM64
        } else {
            Self::LINUX_X64
        }
    }

    pub fn matches_os(&self, name: &str) -> bool {
        self.os_name == name
    }

    pub fn matches_arch(&self, arch: &str) -> bool {
        self.arches.contains(&arch)
    }

    pub fn matches_jvm_arch(&self, arch: &str) -> bool {
        self.jvm_arches.contains(&arch)
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}
