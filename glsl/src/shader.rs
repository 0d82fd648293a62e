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


use glslang::{error::GlslangError, Compiler, ShaderInput, ShaderSource};
use log::{debug, trace};

use crate::environment::{Environment, Stage};

pub const VERSION_PART_NAME: &str = "__internal_glsl_version__";

#[derive(Clone, Debug)]
pub struct Part
{
    code: String,        //Source code
    name: Option<String> //Optional name of source code
}

impl Part
{
    pub fn new<T: AsRef<str>>(code: T) -> Part
    {
        return Part {
            code: String::from(code.as_ref()),
            name: None
        };
    }

    pub fn new_with_name<T: AsRef<str>, T1: AsRef<str>>(code: T, name: T1) -> Part
    {
        return Part {
            code: String::from(code.as_ref()),
            name: Some(String::from(name.as_ref()))
        };
    }

    pub fn get_name(&self) -> Option<&str>
    {
        return self.name.as_deref();
    }

    fn declares_version(&self) -> bool
    {
        self.code.lines().any(|line| {
            let line = line.trim_start();
            line.strip_prefix('#')
                .map(|v| v.trim_start().starts_with("version"))
                .unwrap_or(false)
        })
    }
}

fn describe(err: GlslangError) -> String
{
    match err {
        GlslangError::ParseError(log) | GlslangError::PreprocessError(log) => log.log,
        e => format!("ERROR: {}\n", e)
    }
}

fn compile(env: &Environment, source: String) -> Result<glslang::Shader<'static>, String>
{
    //glslang takes a C string
    if source.contains('\0') {
        return Err(String::from("ERROR: source contains a NUL character\n"));
    }
    let compiler =
        Compiler::acquire().ok_or_else(|| String::from("ERROR: the glslang compiler could not be initialized\n"))?;
    let source = ShaderSource::from(source);
    let defines = env.get_defines();
    let input = ShaderInput::new(
        &source,
        env.get_stage().into(),
        &env.get_compiler_options(),
        Some(defines.as_slice()),
        None
    )
    .map_err(describe)?;
    compiler.create_shader(input).map_err(describe)
}

pub struct Builder
{
    env: Environment,
    parts: Vec<Part>
}

impl Builder
{
    pub fn new(env: Environment) -> Builder
    {
        return Builder {
            env,
            parts: Vec::new()
        };
    }

    pub fn add_part(mut self, p: Part) -> Self
    {
        self.parts.push(p);
        return self;
    }

    pub fn parse(self) -> Shader
    {
        let stage = self.env.get_stage();
        let name = self
            .parts
            .iter()
            .filter_map(|v| v.get_name())
            .find(|v| *v != VERSION_PART_NAME)
            .unwrap_or("<source>")
            .to_owned();
        let mut parts = self.parts;
        if !parts.iter().any(|v| v.declares_version()) {
            debug!("Shader '{}' does not declare a version, defaulting to {}", name, self.env.get_default_version());
            parts.insert(0, Part::new_with_name(self.env.version_header(), VERSION_PART_NAME));
        }
        let mut source = String::new();
        for part in &parts {
            source.push_str(&part.code);
            if !part.code.ends_with('\n') {
                source.push('\n');
            }
        }
        trace!("Shader source for '{}':\n{}", name, source);
        debug!("Compiling {} shader '{}'...", stage, name);
        let (handle, info_log) = match compile(&self.env, source) {
            Ok(shader) => {
                let log = shader.get_log();
                (Some(shader), log)
            },
            Err(log) => (None, log)
        };
        return Shader {
            stage,
            name,
            info_log,
            handle
        };
    }
}

pub struct Shader
{
    stage: Stage,
    name: String,
    info_log: String,
    handle: Option<glslang::Shader<'static>>
}

impl Shader
{
    pub fn get_info_log(&self) -> &str
    {
        return &self.info_log;
    }

    pub fn check(&self) -> bool
    {
        return self.handle.is_some();
    }

    pub fn get_stage(&self) -> Stage
    {
        return self.stage;
    }

    pub fn get_name(&self) -> &str
    {
        return &self.name;
    }

    /// Source text after macro expansion, or None if the shader failed to compile.
    pub fn get_preprocessed_code(&self) -> Option<String>
    {
        return self.handle.as_ref().map(|v| v.get_preprocessed_code());
    }

    pub(crate) fn get_handle(&self) -> Option<&glslang::Shader<'static>>
    {
        return self.handle.as_ref();
    }
}
