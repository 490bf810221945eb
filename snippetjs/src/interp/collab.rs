//! External capabilities reachable from evaluated code
//!
//! `executeToken(id, ...)` runs a separately authored snippet and
//! `staticcallContract(address, signature, returnType, ...)` performs a
//! read-only external call. Both are supplied by the host.

use super::HostValue;
use crate::decimal::Decimal;
use crate::error::{Result, SnippetError};

/// Runs the snippet registered under an id
pub trait TokenExecutor {
    fn execute_token(&self, id: &Decimal, args: &[HostValue]) -> Result<HostValue>;
}

/// Encodes arguments per `signature`, calls `address` read-only and decodes
/// the answer according to the `return_type` descriptor
pub trait ContractCaller {
    fn static_call(
        &self,
        address: &str,
        signature: &str,
        return_type: &HostValue,
        args: &[HostValue],
    ) -> Result<HostValue>;
}

impl<F> TokenExecutor for F
where
    F: Fn(&Decimal, &[HostValue]) -> Result<HostValue>,
{
    fn execute_token(&self, id: &Decimal, args: &[HostValue]) -> Result<HostValue> {
        self(id, args)
    }
}

/// The capabilities injected into one interpretation call
#[derive(Default)]
pub struct Collaborators {
    token_executor: Option<Box<dyn TokenExecutor>>,
    contract_caller: Option<Box<dyn ContractCaller>>,
}

impl Collaborators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token_executor(mut self, executor: impl TokenExecutor + 'static) -> Self {
        self.token_executor = Some(Box::new(executor));
        self
    }

    pub fn with_contract_caller(mut self, caller: impl ContractCaller + 'static) -> Self {
        self.contract_caller = Some(Box::new(caller));
        self
    }

    pub fn execute_token(&self, id: &Decimal, args: &[HostValue]) -> Result<HostValue> {
        let Some(executor) = &self.token_executor else {
            log::warn!("executeToken({id}) called without a token executor");
            return Err(SnippetError::collaborator("no token executor is configured"));
        };
        log::trace!("executeToken({id}) with {} args", args.len());
        executor.execute_token(id, args)
    }

    pub fn static_call(
        &self,
        address: &str,
        signature: &str,
        return_type: &HostValue,
        args: &[HostValue],
    ) -> Result<HostValue> {
        let Some(caller) = &self.contract_caller else {
            log::warn!("staticcallContract({address}) called without a contract caller");
            return Err(SnippetError::collaborator("no contract caller is configured"));
        };
        log::trace!("staticcallContract({address}, {signature})");
        caller.static_call(address, signature, return_type, args)
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("token_executor", &self.token_executor.is_some())
            .field("contract_caller", &self.contract_caller.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl ContractCaller for Echo {
        fn static_call(&self, _: &str, signature: &str, _: &HostValue, _: &[HostValue]) -> Result<HostValue> {
            Ok(HostValue::string(signature))
        }
    }

    #[test]
    fn test_missing_collaborators() {
        let collaborators = Collaborators::new();
        let err = collaborators.execute_token(&Decimal::one(), &[]).unwrap_err();
        assert_eq!(err.kind(), "CollaboratorError");
        let err = collaborators.static_call("0x0", "f()", &HostValue::Undefined, &[]).unwrap_err();
        assert!(err.message().contains("contract caller"));
    }

    #[test]
    fn test_closure_token_executor() {
        let collaborators =
            Collaborators::new().with_token_executor(|id: &Decimal, args: &[HostValue]| -> Result<HostValue> {
                Ok(HostValue::string(format!("{id}:{}", args.len())))
            });
        let result = collaborators.execute_token(&Decimal::from(7i64), &[HostValue::Null]).unwrap();
        assert_eq!(result.to_string(), "7:1");
    }

    #[test]
    fn test_contract_caller() {
        let collaborators = Collaborators::new().with_contract_caller(Echo);
        let result = collaborators.static_call("0x0", "name()", &HostValue::Undefined, &[]).unwrap();
        assert_eq!(result.as_str(), Some("name()"));
    }
}
