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


use std::fmt::Write;

use glslang::{error::GlslangError, Compiler};
use log::{debug, info};

use crate::environment::Stage;
use crate::error::Error;
use crate::reflection::{reflect_stage, Reflection, ReflectionOptions};
use crate::shader::Shader;

const STAGES: [Stage; 2] = [Stage::Vertex, Stage::Fragment];

fn link_error(log: &mut String, stage: Stage, msg: &str)
{
    //Writing to a String never fails
    let _ = writeln!(log, "ERROR: Linking {} stage: {}", stage, msg);
}

pub struct Builder<'a>
{
    shaders: Vec<&'a Shader>
}

impl<'a> Builder<'a>
{
    pub fn new() -> Self
    {
        Self {
            shaders: Vec::new()
        }
    }

    pub fn add_shader(mut self, shader: &'a Shader) -> Self
    {
        self.shaders.push(shader);
        self
    }

    /// Merges the units of each stage and checks the interfaces between stages.
    fn link_units(&self, log: &mut String) -> bool
    {
        let compiler = match Compiler::acquire() {
            Some(v) => v,
            None => {
                log.push_str("ERROR: the glslang compiler could not be initialized\n");
                return false;
            }
        };
        let mut program = glslang::Program::new(compiler);
        for shader in &self.shaders {
            if let Some(handle) = shader.get_handle() {
                debug!("Adding {} shader '{}' to program", shader.get_stage(), shader.get_name());
                program.add_shader(handle);
            }
        }
        match program.link() {
            Ok(()) => true,
            Err(GlslangError::LinkError(v)) => {
                log.push_str(&v.log);
                false
            },
            Err(e) => {
                let _ = writeln!(log, "ERROR: {}", e);
                false
            }
        }
    }

    pub fn link(self) -> Program<'a>
    {
        info!("Linking {} shader(s)...", self.shaders.len());
        let mut info_log = String::new();
        for shader in self.shaders.iter().filter(|v| !v.check()) {
            link_error(
                &mut info_log,
                shader.get_stage(),
                &format!("'{}' was not successfully compiled", shader.get_name())
            );
        }
        let valid = info_log.is_empty() && self.link_units(&mut info_log);
        Program {
            shaders: self.shaders,
            info_log,
            valid
        }
    }
}

impl<'a> Default for Builder<'a>
{
    fn default() -> Self
    {
        Self::new()
    }
}

pub struct Program<'a>
{
    shaders: Vec<&'a Shader>,
    info_log: String,
    valid: bool
}

impl<'a> Program<'a>
{
    pub fn get_info_log(&self) -> &str
    {
        &self.info_log
    }

    pub fn check(&self) -> bool
    {
        self.valid
    }

    pub fn build_reflection(&self, options: &ReflectionOptions) -> Result<Reflection, Error>
    {
        if !self.valid {
            return Err(Error::NotLinked);
        }
        let mut reflection = Reflection::default();
        for stage in STAGES {
            let units: Vec<&Shader> = self.shaders.iter().copied().filter(|v| v.get_stage() == stage).collect();
            if units.is_empty() {
                continue;
            }
            reflection.merge(stage, reflect_stage(&units, options.is_all_uniforms())?);
        }
        debug!("Reflected {} uniform(s)", reflection.get_num_uniforms());
        Ok(reflection)
    }
}
