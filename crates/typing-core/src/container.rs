//! Instance container: a registry of activators keyed by instance type.
//!
//! Activators are registered once at bootstrap and invoked per request,
//! optionally with a parameter (the token-scoped HTTP client), so every
//! request gets its own adapter instance.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::note::Notestore;
use crate::section::Sectionstore;
use crate::signin::{Auth, Userinfo};

/// Tag identifying which kind of instance an activator builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceType {
    Auth,
    Userinfo,
    Notestore,
    Sectionstore,
}

/// An instance produced by an activator.
#[derive(Clone)]
pub enum Instance {
    Auth(Arc<dyn Auth>),
    Userinfo(Arc<dyn Userinfo>),
    Notestore(Arc<dyn Notestore>),
    Sectionstore(Arc<dyn Sectionstore>),
}

impl Instance {
    pub fn instance_type(&self) -> InstanceType {
        match self {
            Instance::Auth(_) => InstanceType::Auth,
            Instance::Userinfo(_) => InstanceType::Userinfo,
            Instance::Notestore(_) => InstanceType::Notestore,
            Instance::Sectionstore(_) => InstanceType::Sectionstore,
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance::{:?}", self.instance_type())
    }
}

/// Builds a new instance, optionally from a per-call parameter.
pub type Activator<P> = Box<dyn Fn(Option<&P>) -> anyhow::Result<Instance> + Send + Sync>;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("activator not found for {0:?}")]
    ActivatorNotFound(InstanceType),

    #[error("instance creation failed, check the activator: [{0:#}]")]
    ActivationFailed(anyhow::Error),

    #[error("activator for {expected:?} returned an instance of {actual:?}")]
    UnexpectedInstance {
        expected: InstanceType,
        actual: InstanceType,
    },
}

/// Registry mapping instance types to activators.
pub struct Container<P> {
    activators: HashMap<InstanceType, Activator<P>>,
}

impl<P> Container<P> {
    pub fn new() -> Self {
        Self {
            activators: HashMap::new(),
        }
    }

    /// Register the activator for an instance type, replacing any previous one.
    pub fn add<F>(&mut self, instance_type: InstanceType, activator: F)
    where
        F: Fn(Option<&P>) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        self.activators.insert(instance_type, Box::new(activator));
    }

    /// Create a new instance of the given type.
    pub fn get_instance(
        &self,
        instance_type: InstanceType,
        params: Option<&P>,
    ) -> Result<Instance, ContainerError> {
        let activator = self
            .activators
            .get(&instance_type)
            .ok_or(ContainerError::ActivatorNotFound(instance_type))?;

        let instance = activator(params).map_err(ContainerError::ActivationFailed)?;
        if instance.instance_type() != instance_type {
            return Err(ContainerError::UnexpectedInstance {
                expected: instance_type,
                actual: instance.instance_type(),
            });
        }
        Ok(instance)
    }

    pub fn auth(&self) -> Result<Arc<dyn Auth>, ContainerError> {
        match self.get_instance(InstanceType::Auth, None)? {
            Instance::Auth(auth) => Ok(auth),
            other => Err(unexpected(InstanceType::Auth, &other)),
        }
    }

    pub fn userinfo(&self, params: &P) -> Result<Arc<dyn Userinfo>, ContainerError> {
        match self.get_instance(InstanceType::Userinfo, Some(params))? {
            Instance::Userinfo(userinfo) => Ok(userinfo),
            other => Err(unexpected(InstanceType::Userinfo, &other)),
        }
    }

    pub fn notestore(&self, params: &P) -> Result<Arc<dyn Notestore>, ContainerError> {
        match self.get_instance(InstanceType::Notestore, Some(params))? {
            Instance::Notestore(store) => Ok(store),
            other => Err(unexpected(InstanceType::Notestore, &other)),
        }
    }

    pub fn sectionstore(&self, params: &P) -> Result<Arc<dyn Sectionstore>, ContainerError> {
        match self.get_instance(InstanceType::Sectionstore, Some(params))? {
            Instance::Sectionstore(store) => Ok(store),
            other => Err(unexpected(InstanceType::Sectionstore, &other)),
        }
    }
}

impl<P> Default for Container<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for Container<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("activators", &self.activators.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn unexpected(expected: InstanceType, instance: &Instance) -> ContainerError {
    ContainerError::UnexpectedInstance {
        expected,
        actual: instance.instance_type(),
    }
}

/// Unwrap the parameter an activator needs.
pub fn require_param<P>(params: Option<&P>) -> anyhow::Result<&P> {
    params.ok_or_else(|| anyhow::anyhow!("activator parameter is missing"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::signin::User;
    use async_trait::async_trait;

    struct StaticUserinfo(String);

    #[async_trait]
    impl Userinfo for StaticUserinfo {
        async fn get(&self) -> Result<User> {
            Ok(User {
                id: self.0.clone(),
                ..Default::default()
            })
        }
    }

    fn container() -> Container<String> {
        let mut container = Container::new();
        container.add(InstanceType::Userinfo, |params: Option<&String>| {
            let token = require_param(params)?;
            Ok(Instance::Userinfo(Arc::new(StaticUserinfo(token.clone()))))
        });
        container
    }

    #[tokio::test]
    async fn test_activator_receives_param() {
        let userinfo = container().userinfo(&"token-1".to_string()).unwrap();
        assert_eq!(userinfo.get().await.unwrap().id, "token-1");
    }

    #[test]
    fn test_unregistered_type() {
        let Err(err) = container().auth() else {
            panic!("expected auth activation to fail");
        };
        assert!(matches!(
            err,
            ContainerError::ActivatorNotFound(InstanceType::Auth)
        ));
        assert!(err.to_string().starts_with("activator not found"));
    }

    #[test]
    fn test_activator_error_is_wrapped() {
        let mut container: Container<String> = Container::new();
        container.add(InstanceType::Notestore, |_| anyhow::bail!("drive unavailable"));

        let Err(err) = container.notestore(&"t".to_string()) else {
            panic!("expected notestore activation to fail");
        };
        assert!(matches!(err, ContainerError::ActivationFailed(_)));
        let msg = err.to_string();
        assert!(msg.starts_with("instance creation failed, check the activator"));
        assert!(msg.contains("drive unavailable"));
    }

    #[test]
    fn test_missing_param_fails_activation() {
        let err = container()
            .get_instance(InstanceType::Userinfo, None)
            .unwrap_err();
        assert!(matches!(err, ContainerError::ActivationFailed(_)));
    }

    #[test]
    fn test_wrong_instance_kind_is_rejected() {
        let mut container: Container<String> = Container::new();
        container.add(InstanceType::Sectionstore, |_| {
            Ok(Instance::Userinfo(Arc::new(StaticUserinfo(String::new()))))
        });

        let Err(err) = container.sectionstore(&String::new()) else {
            panic!("expected sectionstore activation to fail");
        };
        assert!(matches!(
            err,
            ContainerError::UnexpectedInstance {
                expected: InstanceType::Sectionstore,
                actual: InstanceType::Userinfo,
            }
        ));
    }

    #[test]
    fn test_add_replaces_previous_activator() {
        let mut container = container();
        container.add(InstanceType::Userinfo, |_| anyhow::bail!("replaced"));
        assert!(container.userinfo(&String::new()).is_err());
    }
}
