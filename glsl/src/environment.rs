// Copyright (c) 2022, BlockProject 3D
//
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
//     * Redistributions of source code must retain the above copyright notice,
//       this list of conditions and the following disclaimer.
//     * Redistributions in binary form must reproduce the above copyright notice,
//       this list of conditions and the following disclaimer in the documentation
//       and/or other materials provided with the distribution.
//     * Neither the name of BlockProject 3D nor the names of its contributors
//       may be used to endorse or promote products derived from this software
//       without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT OWNER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF
// LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING
// NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS
// SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.


use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use glslang::{CompilerOptions, ShaderMessage, ShaderStage, SourceLanguage, Target};

/// Language version used when a source string does not declare one.
pub const DEFAULT_VERSION: u16 = 110;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage
{
    Vertex,
    Fragment
}

impl Stage
{
    pub fn into(self) -> ShaderStage
    {
        match self {
            Stage::Vertex => ShaderStage::Vertex,
            Stage::Fragment => ShaderStage::Fragment
        }
    }

    pub fn name(&self) -> &'static str
    {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment"
        }
    }
}

impl Display for Stage
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        f.write_str(self.name())
    }
}

fn is_es_version(version: u16) -> bool
{
    matches!(version, 100 | 300 | 310 | 320)
}

#[derive(Clone, Debug)]
pub struct Environment
{
    stage: Stage,
    default_version: u16,
    defines: BTreeMap<String, String>
}

impl Environment
{
    pub fn new(stage: Stage) -> Environment
    {
        return Environment {
            stage,
            default_version: DEFAULT_VERSION,
            defines: BTreeMap::new()
        };
    }

    pub fn default_version(mut self, version: u16) -> Self
    {
        self.default_version = version;
        return self;
    }

    pub fn define<T: AsRef<str>, T1: AsRef<str>>(mut self, name: T, value: T1) -> Self
    {
        self.defines.insert(name.as_ref().into(), value.as_ref().into());
        return self;
    }

    pub fn get_stage(&self) -> Stage
    {
        return self.stage;
    }

    pub fn get_default_version(&self) -> u16
    {
        return self.default_version;
    }

    /// Source text prepended to shaders which do not declare a `#version`.
    ///
    /// The trailing `#line` directive restarts numbering so that diagnostics point at lines of
    /// the user's file. Before GLSL 330 (ES 300) `#line N` numbers the following line N + 1.
    pub fn version_header(&self) -> String
    {
        let version = self.default_version;
        let (profile, first_line) = match version {
            100 => ("", 0),
            v if is_es_version(v) => (" es", 1),
            v if v >= 330 => ("", 1),
            _ => ("", 0)
        };
        return format!("#version {}{}\n#line {}\n", version, profile, first_line);
    }

    pub fn get_defines(&self) -> Vec<(&str, Option<&str>)>
    {
        return self
            .defines
            .iter()
            .map(|(k, v)| (k.as_str(), Some(v.as_str())))
            .collect();
    }

    pub fn get_compiler_options(&self) -> CompilerOptions
    {
        return CompilerOptions {
            source_language: SourceLanguage::GLSL,
            target: Target::None(None),
            version_profile: None,
            messages: ShaderMessage::DEFAULT
        };
    }
}
