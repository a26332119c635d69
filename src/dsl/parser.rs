//! Parser for the netlist format.

use std::collections::HashMap;

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{KirchhoffError, Result};

/// Recursive-descent parser over a token stream, one line per statement.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser, reading the first token.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire netlist.
    pub fn parse(&mut self) -> Result<CircuitAst> {
        let mut ast = CircuitAst::new();

        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Newline => {}
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    for node in &component.nodes {
                        ast.note_node(node);
                    }
                    ast.components.push(component);
                }
                _ => {
                    return Err(KirchhoffError::parse(
                        self.current.line,
                        format!("unexpected '{}' at start of line", self.current.text),
                    ));
                }
            }
            self.end_of_line()?;
        }

        log::debug!(
            "parsed netlist: {} devices, {} wires, {} nodes",
            ast.components.len(),
            ast.wires.len(),
            ast.nodes.len()
        );
        Ok(ast)
    }

    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn end_of_line(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Newline => {
                self.advance()?;
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(KirchhoffError::parse(
                self.current.line,
                format!("unexpected trailing '{}'", self.current.text),
            )),
        }
    }

    /// A node name: identifier or integer literal.
    fn expect_node(&mut self, what: &str) -> Result<String> {
        match self.current.kind {
            TokenKind::Identifier | TokenKind::Number => {
                let tok = self.advance()?;
                Ok(normalize_node(tok.text))
            }
            _ => Err(KirchhoffError::parse(self.current.line, format!("expected {}", what))),
        }
    }

    fn parse_directive(&mut self, ast: &mut CircuitAst) -> Result<()> {
        let directive = self.advance()?;
        let line = directive.line;

        match directive.text.to_ascii_lowercase().as_str() {
            ".wire" => {
                let a = self.expect_node("first node of .wire")?;
                let b = self.expect_node("second node of .wire")?;
                ast.note_node(&a);
                ast.note_node(&b);
                ast.wires.push(WireDef { nodes: [a, b], line });
            }
            ".reduce" => ast.reduce = true,
            ".ground" => {
                let node = self.expect_node("node after .ground")?;
                ast.note_node(&node);
                ast.ground = Some(node);
            }
            _ => {
                return Err(KirchhoffError::parse(
                    line,
                    format!("unknown directive: {}", directive.text),
                ));
            }
        }
        Ok(())
    }

    fn parse_component(&mut self) -> Result<ComponentDef> {
        let name_tok = self.advance()?;
        let line = name_tok.line;
        let name = name_tok.text;
        let component_type = ComponentType::from_name(&name).ok_or_else(|| KirchhoffError::UnknownComponentType {
            component_type: name.clone(),
            line,
        })?;

        let mut nodes = Vec::with_capacity(2);
        let mut value = None;
        let mut params = HashMap::new();

        while !self.at_line_end() {
            let tok = self.advance()?;
            match tok.kind {
                TokenKind::Identifier | TokenKind::Number if self.current.kind == TokenKind::Equals => {
                    self.advance()?;
                    let key = tok.text.to_ascii_lowercase();
                    if !component_type.accepts_param(&key) {
                        return Err(KirchhoffError::invalid_component(
                            &name,
                            line,
                            format!("unknown parameter '{}'", tok.text),
                        ));
                    }
                    let raw = self.advance()?;
                    let v = parse_value(&raw.text).ok_or_else(|| {
                        KirchhoffError::parse(line, format!("invalid value '{}' for {}", raw.text, key))
                    })?;
                    params.insert(key, v);
                }
                TokenKind::Identifier | TokenKind::Number if nodes.len() < 2 => {
                    nodes.push(normalize_node(tok.text));
                }
                TokenKind::Identifier | TokenKind::Number if value.is_none() => {
                    let v = parse_value(&tok.text)
                        .ok_or_else(|| KirchhoffError::parse(line, format!("invalid value '{}'", tok.text)))?;
                    value = Some(v);
                }
                _ => {
                    return Err(KirchhoffError::invalid_component(
                        &name,
                        line,
                        format!("unexpected argument '{}'", tok.text),
                    ));
                }
            }
        }

        if nodes.len() < 2 {
            return Err(KirchhoffError::invalid_component(
                &name,
                line,
                format!("expected 2 nodes, got {}", nodes.len()),
            ));
        }
        if component_type.requires_value() && value.is_none() {
            return Err(KirchhoffError::invalid_component(&name, line, "missing value"));
        }

        Ok(ComponentDef {
            component_type,
            name,
            nodes,
            value,
            params,
            line,
        })
    }
}

fn normalize_node(name: String) -> String {
    if is_ground_name(&name) {
        "0".to_string()
    } else {
        name
    }
}
