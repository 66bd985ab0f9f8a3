// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)
// DashFlow Project - Language, Framework, and Build System Detection

//! # Language Detection
//!
//! Types and detection logic for programming languages, frameworks, and build systems.

use serde::{Deserialize, Serialize};

/// Programming languages detected in a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Rust,
    Python,
    TypeScript,
    JavaScript,
    Go,
    Java,
    CSharp,
    Cpp,
    C,
    Ruby,
    PHP,
    Swift,
    Kotlin,
    Scala,
    Shell,
    Markdown,
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "rs" => Some(Language::Rust),
            "py" | "pyw" | "pyi" => Some(Language::Python),
            "ts" | "tsx" => Some(Language::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "go" => Some(Language::Go),
            "java" => Some(Language::Java),
            "cs" => Some(Language::CSharp),
            "cpp" | "cc" | "cxx" | "hpp" | "hxx" => Some(Language::Cpp),
            "c" | "h" => Some(Language::C),
            "rb" | "rake" => Some(Language::Ruby),
            "php" => Some(Language::PHP),
            "swift" => Some(Language::Swift),
            "kt" | "kts" => Some(Language::Kotlin),
            "scala" | "sc" => Some(Language::Scala),
            "sh" | "bash" | "zsh" | "fish" => Some(Language::Shell),
            "md" | "markdown" => Some(Language::Markdown),
            _ => None,
        }
    }

    /// Get display name for the language
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Rust => "Rust",
            Language::Python => "Python",
            Language::TypeScript => "TypeScript",
            Language::JavaScript => "JavaScript",
            Language::Go => "Go",
            Language::Java => "Java",
            Language::CSharp => "C#",
            Language::Cpp => "C++",
            Language::C => "C",
            Language::Ruby => "Ruby",
            Language::PHP => "PHP",
            Language::Swift => "Swift",
            Language::Kotlin => "Kotlin",
            Language::Scala => "Scala",
            Language::Shell => "Shell",
            Language::Markdown => "Markdown",
            Language::Unknown => "Unknown",
        }
    }
}

/// Frameworks detected in a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Framework {
    // Rust
    Actix,
    Axum,
    Rocket,
    Warp,
    Tokio,

    // Python
    Django,
    Flask,
    FastAPI,
    PyTorch,
    TensorFlow,

    // JavaScript/TypeScript
    React,
    Vue,
    Angular,
    NextJs,
    Express,
    NestJs,

    // Go
    Gin,
    Echo,
    Fiber,

    // Java
    Spring,
    Quarkus,

    // Ruby
    Rails,
    Sinatra,

    Unknown,
}

impl Framework {
    /// Get display name for the framework
    pub fn display_name(&self) -> &'static str {
        match self {
            Framework::Actix => "Actix Web",
            Framework::Axum => "Axum",
            Framework::Rocket => "Rocket",
            Framework::Warp => "Warp",
            Framework::Tokio => "Tokio",
            Framework::Django => "Django",
            Framework::Flask => "Flask",
            Framework::FastAPI => "FastAPI",
            Framework::PyTorch => "PyTorch",
            Framework::TensorFlow => "TensorFlow",
            Framework::React => "React",
            Framework::Vue => "Vue.js",
            Framework::Angular => "Angular",
            Framework::NextJs => "Next.js",
            Framework::Express => "Express",
            Framework::NestJs => "NestJS",
            Framework::Gin => "Gin",
            Framework::Echo => "Echo",
            Framework::Fiber => "Fiber",
            Framework::Spring => "Spring",
            Framework::Quarkus => "Quarkus",
            Framework::Rails => "Ruby on Rails",
            Framework::Sinatra => "Sinatra",
            Framework::Unknown => "Unknown",
        }
    }
}

/// Build systems detected in a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildSystem {
    // Rust
    Cargo,

    // Python
    Pip,
    Poetry,
    Pipenv,
    Conda,
    Uv,

    // JavaScript/TypeScript
    Npm,
    Yarn,
    Pnpm,
    Bun,

    // Go
    GoMod,

    // Java
    Maven,
    Gradle,

    // C/C++
    Make,
    CMake,
    Bazel,

    // Ruby
    Bundler,

    // .NET
    DotNet,

    Unknown,
}

impl BuildSystem {
    /// Detect build system from config file name
    pub fn from_config_file(filename: &str) -> Option<Self> {
        match filename.to_lowercase().as_str() {
            "cargo.toml" => Some(BuildSystem::Cargo),
            "requirements.txt" | "setup.py" | "setup.cfg" => Some(BuildSystem::Pip),
            "pyproject.toml" => Some(BuildSystem::Poetry), // Could also be pip/uv
            "pipfile" | "pipfile.lock" => Some(BuildSystem::Pipenv),
            "environment.yml" | "environment.yaml" => Some(BuildSystem::Conda),
            "uv.lock" => Some(BuildSystem::Uv),
            "package.json" => Some(BuildSystem::Npm),
            "yarn.lock" => Some(BuildSystem::Yarn),
            "pnpm-lock.yaml" => Some(BuildSystem::Pnpm),
            "bun.lockb" => Some(BuildSystem::Bun),
            "go.mod" => Some(BuildSystem::GoMod),
            "pom.xml" => Some(BuildSystem::Maven),
            "build.gradle" | "build.gradle.kts" | "settings.gradle" | "settings.gradle.kts" => {
                Some(BuildSystem::Gradle)
            }
            "makefile" | "gnumakefile" => Some(BuildSystem::Make),
            "cmakelists.txt" => Some(BuildSystem::CMake),
            "build" | "workspace" => Some(BuildSystem::Bazel),
            "gemfile" => Some(BuildSystem::Bundler),
            // Use case-insensitive comparison for file extensions (Windows uses .CSPROJ, .SLN, etc.)
            _ if {
                let lower = filename.to_ascii_lowercase();
                lower.ends_with(".csproj") || lower.ends_with(".fsproj")
            } =>
            {
                Some(BuildSystem::DotNet)
            }
            _ if filename.to_ascii_lowercase().ends_with(".sln") => Some(BuildSystem::DotNet),
            _ => None,
        }
    }

    /// Get display name for the build system
    pub fn display_name(&self) -> &'static str {
        match self {
            BuildSystem::Cargo => "Cargo",
            BuildSystem::Pip => "pip",
            BuildSystem::Poetry => "Poetry",
            BuildSystem::Pipenv => "Pipenv",
            BuildSystem::Conda => "Conda",
            BuildSystem::Uv => "uv",
            BuildSystem::Npm => "npm",
            BuildSystem::Yarn => "Yarn",
            BuildSystem::Pnpm => "pnpm",
            BuildSystem::Bun => "Bun",
            BuildSystem::GoMod => "Go Modules",
            BuildSystem::Maven => "Maven",
            BuildSystem::Gradle => "Gradle",
            BuildSystem::Make => "Make",
            BuildSystem::CMake => "CMake",
            BuildSystem::Bazel => "Bazel",
            BuildSystem::Bundler => "Bundler",
            BuildSystem::DotNet => ".NET",
            BuildSystem::Unknown => "Unknown",
        }
    }
}
